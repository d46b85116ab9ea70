use crate::core::cache::DEFAULT_TTL;
use crate::core::aggregator::DEFAULT_GLOBAL_TIMEOUT;
use crate::domain::ports::DEFAULT_LOOKUP_TIMEOUT;
use crate::utils::error::{BasketError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("smart-basket/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketConfig {
    pub cache: Option<CacheConfig>,
    pub aggregator: Option<AggregatorConfig>,
    pub http: Option<HttpConfig>,
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub global_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub r#type: String,
    pub search_url: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    pub html: Option<HtmlSelectors>,
    pub json: Option<JsonFields>,
}

/// CSS selectors for stores that only expose a search results page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlSelectors {
    pub product_selector: String,
    pub name_selector: String,
    pub price_selector: String,
    pub link_selector: Option<String>,
}

/// Dotted paths into a store's JSON search API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonFields {
    pub results_path: Option<String>,
    pub name_field: String,
    pub price_field: String,
    pub url_field: Option<String>,
    pub url_prefix: Option<String>,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT)
    }
}

impl BasketConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BasketError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${STORE_API_KEY})
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        result.to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.stores.is_empty() {
            return Err(BasketError::MissingConfigError {
                field: "stores".to_string(),
            });
        }

        if let Some(ttl) = self.cache.as_ref().and_then(|c| c.ttl_seconds) {
            validation::validate_positive_number("cache.ttl_seconds", ttl, 1)?;
        }

        if let Some(global) = self
            .aggregator
            .as_ref()
            .and_then(|a| a.global_timeout_seconds)
        {
            validation::validate_range("aggregator.global_timeout_seconds", global, 1, 300)?;
        }

        validation::validate_unique_names("stores.name", self.stores.iter().map(|s| s.name.as_str()))?;

        for store in &self.stores {
            validation::validate_non_empty_string("stores.name", &store.name)?;
            validation::validate_search_template("stores.search_url", &store.search_url)?;
            if let Some(timeout) = store.timeout_seconds {
                validation::validate_range("stores.timeout_seconds", timeout, 1, 60)?;
            }

            match store.r#type.as_str() {
                "html" => {
                    let selectors = validation::validate_required_field("stores.html", &store.html)?;
                    validation::validate_non_empty_string(
                        "stores.html.product_selector",
                        &selectors.product_selector,
                    )?;
                    validation::validate_non_empty_string(
                        "stores.html.price_selector",
                        &selectors.price_selector,
                    )?;
                }
                "json" => {
                    let fields = validation::validate_required_field("stores.json", &store.json)?;
                    validation::validate_non_empty_string("stores.json.price_field", &fields.price_field)?;
                }
                other => {
                    return Err(BasketError::InvalidConfigValueError {
                        field: "stores.type".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported store type. Valid types: html, json".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        self.cache
            .as_ref()
            .and_then(|c| c.ttl_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL)
    }

    pub fn set_ttl_seconds(&mut self, ttl_seconds: u64) {
        self.cache
            .get_or_insert(CacheConfig { ttl_seconds: None })
            .ttl_seconds = Some(ttl_seconds);
    }

    pub fn global_timeout(&self) -> Duration {
        self.aggregator
            .as_ref()
            .and_then(|a| a.global_timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GLOBAL_TIMEOUT)
    }

    pub fn user_agent(&self) -> &str {
        self.http
            .as_ref()
            .and_then(|h| h.user_agent.as_deref())
            .unwrap_or(DEFAULT_USER_AGENT)
    }
}

impl Validate for BasketConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
