use thiserror::Error;

#[derive(Error, Debug)]
pub enum BasketError {
    #[error("Shopping list is empty: enter at least one item")]
    EmptyList,

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Lookup failed for {store}: {message}")]
    LookupError { store: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserInput,
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BasketError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn lookup(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LookupError {
            store: store.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyList => ErrorCategory::UserInput,
            Self::InvalidInput { .. } => ErrorCategory::System,
            Self::HttpError(_) | Self::LookupError { .. } => ErrorCategory::Network,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Data,
            Self::IoError(_) => ErrorCategory::System,
            Self::TomlError(_)
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::UserInput => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_user_error(&self) -> bool {
        self.category() == ErrorCategory::UserInput
    }

    /// HTTP status a host should answer with for this error.
    pub fn status_code(&self) -> u16 {
        if self.is_user_error() {
            400
        } else {
            500
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyList => "Please enter at least one item".to_string(),
            Self::InvalidInput { .. } => "Failed to fetch prices".to_string(),
            Self::HttpError(_) | Self::LookupError { .. } => {
                "Could not reach one of the stores".to_string()
            }
            Self::TomlError(_)
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => format!("Configuration problem: {}", self),
            _ => format!("Something went wrong: {}", self),
        }
    }

    /// Message safe to hand to a remote caller: internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        if self.is_user_error() {
            self.user_friendly_message()
        } else {
            "Failed to fetch prices".to_string()
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::UserInput => {
                "Enter items separated by commas, new lines or bullets".to_string()
            }
            ErrorCategory::Configuration => {
                "Check the stores and cache sections of the config file".to_string()
            }
            ErrorCategory::Network => "Check your connection and try again".to_string(),
            ErrorCategory::Data => "Try a different output format".to_string(),
            ErrorCategory::System => {
                "Make sure at least one store is configured and the list is not empty".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BasketError>;
