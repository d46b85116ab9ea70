pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, OutputFormat};

pub use crate::config::toml_config::BasketConfig;
pub use crate::core::{aggregator::Aggregator, cache::ResultCache, service::ComparisonService};
pub use crate::domain::model::{
    ItemQuery, ProductMatch, RankedResultSet, ShoppingList, StoreId, StoreResult,
};
pub use crate::domain::money::Money;
pub use crate::domain::ports::SourceAdapter;
pub use crate::utils::error::{BasketError, Result};
