use crate::adapters;
use crate::config::toml_config::BasketConfig;
use crate::core::aggregator::Aggregator;
use crate::core::cache::ResultCache;
use crate::core::parser;
use crate::domain::model::RankedResultSet;
use crate::utils::error::Result;

/// Entry point for a comparison: parse, check the cache, aggregate on a
/// miss. Nothing else writes to the cache.
pub struct ComparisonService {
    aggregator: Aggregator,
    cache: ResultCache,
}

impl ComparisonService {
    pub fn new(aggregator: Aggregator, cache: ResultCache) -> Self {
        Self { aggregator, cache }
    }

    /// Wires adapters, aggregator and cache from a validated config.
    pub fn from_config(config: &BasketConfig) -> Result<Self> {
        let client = adapters::build_client(config.user_agent())?;
        let adapters = adapters::build_adapters(&config.stores, &client)?;
        tracing::info!(
            "Loaded {} store(s), cache TTL {:?}",
            adapters.len(),
            config.ttl()
        );

        let aggregator = Aggregator::new(adapters).with_global_timeout(config.global_timeout());
        Ok(Self::new(aggregator, ResultCache::new(config.ttl())))
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub async fn compare(&self, raw: &str) -> Result<RankedResultSet> {
        let list = parser::parse(raw)?;
        let key = list.cache_key();

        if let Some(cached) = self.cache.get(&key) {
            tracing::info!("♻️ Serving {} item(s) from cache", list.len());
            return Ok(cached);
        }

        let results = self.aggregator.aggregate(&list).await?;
        self.cache.put(key, results.clone());
        Ok(results)
    }

    /// Re-prices the list even when a fresh entry exists, then replaces it.
    pub async fn refresh(&self, raw: &str) -> Result<RankedResultSet> {
        let list = parser::parse(raw)?;
        tracing::info!("🔄 Refreshing prices for {} item(s)", list.len());

        let results = self.aggregator.aggregate(&list).await?;
        self.cache.put(list.cache_key(), results.clone());
        Ok(results)
    }
}
