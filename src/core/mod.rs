pub mod aggregator;
pub mod cache;
pub mod parser;
pub mod service;

pub use crate::domain::model::{ItemQuery, ProductMatch, RankedResultSet, ShoppingList, StoreResult};
pub use crate::domain::ports::SourceAdapter;
pub use crate::utils::error::Result;
