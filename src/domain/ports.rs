use crate::domain::model::{ItemQuery, ProductMatch, StoreId};
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// A retailer that can price a single item.
///
/// `lookup` never fails: network errors, bad pages and misses all come
/// back as [`ProductMatch::miss`] for this adapter's store, so one broken
/// retailer cannot sink a whole comparison.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn store(&self) -> &StoreId;

    /// Upper bound for one `lookup`. The aggregator enforces it as well.
    fn timeout(&self) -> Duration {
        DEFAULT_LOOKUP_TIMEOUT
    }

    async fn lookup(&self, item: &ItemQuery) -> ProductMatch;
}
