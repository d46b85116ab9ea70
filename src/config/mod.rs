pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::{BasketError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "smart-basket")]
#[command(about = "Find the cheapest store for your grocery list")]
pub struct CliConfig {
    /// Path to the TOML store configuration
    #[arg(short, long, default_value = "basket.toml")]
    pub config: String,

    /// Shopping list text, e.g. "Milk, Bread, Eggs"
    #[arg(short, long, conflicts_with = "list_file")]
    pub list: Option<String>,

    /// Read the shopping list from a file
    #[arg(long)]
    pub list_file: Option<String>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Override cache.ttl_seconds from the config file
    #[arg(long)]
    pub ttl_seconds: Option<u64>,

    /// Run the comparison this many times (later runs hit the cache)
    #[arg(long, default_value = "1")]
    pub repeat: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines instead of compact text
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Raw shopping list text from `--list` or `--list-file`.
    pub fn shopping_list(&self) -> Result<String> {
        match (&self.list, &self.list_file) {
            (Some(list), _) => Ok(list.clone()),
            (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
            (None, None) => Err(BasketError::MissingConfigError {
                field: "--list or --list-file".to_string(),
            }),
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("--config", &self.config)?;
        validation::validate_range("--repeat", self.repeat, 1, 100)?;
        if let Some(ttl) = self.ttl_seconds {
            validation::validate_positive_number("--ttl-seconds", ttl, 1)?;
        }
        Ok(())
    }
}
