use crate::domain::model::{ProductMatch, RankedResultSet, ShoppingList, StoreResult};
use crate::domain::ports::SourceAdapter;
use crate::utils::error::{BasketError, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(15);

/// Fans item lookups out to every registered store and ranks the baskets.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    global_timeout: Duration,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            global_timeout: DEFAULT_GLOBAL_TIMEOUT,
        }
    }

    /// Caps the whole fan-out, whatever the per-store timeouts say.
    pub fn with_global_timeout(mut self, global_timeout: Duration) -> Self {
        self.global_timeout = global_timeout;
        self
    }

    pub async fn aggregate(&self, list: &ShoppingList) -> Result<RankedResultSet> {
        if self.adapters.is_empty() {
            return Err(BasketError::invalid_input("no source adapters registered"));
        }
        if list.is_empty() {
            return Err(BasketError::invalid_input("shopping list has no items"));
        }

        let started = Instant::now();
        // A limit too large to represent means no limit from that side.
        let deadline = started.checked_add(self.global_timeout);

        tracing::info!(
            "🛒 Comparing {} item(s) across {} store(s)",
            list.len(),
            self.adapters.len()
        );

        let tasks = self.adapters.iter().enumerate().flat_map(|(store_slot, adapter)| {
            list.items().iter().enumerate().map(move |(item_slot, item)| {
                let adapter = Arc::clone(adapter);
                let item = item.clone();
                let own_deadline = Instant::now().checked_add(adapter.timeout());
                let lookup_deadline = match (deadline, own_deadline) {
                    (Some(global), Some(own)) => Some(global.min(own)),
                    (global, own) => global.or(own),
                };
                let handle = tokio::spawn(async move {
                    let outcome = match lookup_deadline {
                        Some(at) => tokio::time::timeout_at(at, adapter.lookup(&item)).await,
                        None => Ok(adapter.lookup(&item).await),
                    };
                    match outcome {
                        Ok(found) => found,
                        Err(_) => {
                            tracing::warn!(
                                "⏱️ {} timed out looking up '{}'",
                                adapter.store(),
                                item
                            );
                            ProductMatch::miss(adapter.store().clone(), item)
                        }
                    }
                });
                async move { (store_slot, item_slot, handle.await) }
            })
        });

        let completed = join_all(tasks).await;

        let mut grid: Vec<Vec<Option<ProductMatch>>> =
            vec![vec![None; list.len()]; self.adapters.len()];
        for (store_slot, item_slot, outcome) in completed {
            match outcome {
                Ok(found) => grid[store_slot][item_slot] = Some(found),
                Err(e) => tracing::error!(
                    "Lookup task for {} crashed: {}",
                    self.adapters[store_slot].store(),
                    e
                ),
            }
        }

        let stores: Vec<StoreResult> = self
            .adapters
            .iter()
            .zip(grid)
            .map(|(adapter, row)| {
                let items: Vec<ProductMatch> = row
                    .into_iter()
                    .zip(list.items())
                    .map(|(slot, item)| {
                        slot.unwrap_or_else(|| ProductMatch::miss(adapter.store().clone(), item.clone()))
                    })
                    .collect();
                let result = StoreResult::from_matches(adapter.store().clone(), items);
                tracing::debug!(
                    "{}: total {} ({} of {} items priced)",
                    result.store,
                    result.total,
                    result.items.len() - result.unpriced,
                    result.items.len()
                );
                result
            })
            .collect();

        let ranked = RankedResultSet::rank(stores);
        if let Some(best) = ranked.cheapest() {
            tracing::info!(
                "✅ Cheapest basket: {} at {} (took {:?})",
                best.store,
                best.total,
                started.elapsed()
            );
        }
        Ok(ranked)
    }
}
