use crate::adapters::{resolve_link, SearchEndpoint};
use crate::config::toml_config::{JsonFields, StoreConfig};
use crate::domain::model::{ItemQuery, ProductMatch, StoreId};
use crate::domain::money::Money;
use crate::domain::ports::SourceAdapter;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Follows a dotted path such as `data.products.0.price.current`.
/// Numeric segments index into arrays.
pub fn value_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn price_from(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => Money::parse_display(&n.to_string()),
        Value::String(s) => Money::parse_display(s),
        _ => None,
    }
}

/// Adapter for stores with a JSON product search API.
pub struct JsonStoreAdapter {
    endpoint: SearchEndpoint,
    fields: JsonFields,
}

impl JsonStoreAdapter {
    pub fn from_config(store: StoreId, client: Client, config: &StoreConfig) -> Result<Self> {
        let fields = validate_required_field("stores.json", &config.json)?.clone();
        Ok(Self {
            endpoint: SearchEndpoint::from_config(store, client, config),
            fields,
        })
    }

    /// Picks the first search result out of an API response.
    pub fn extract(&self, item: &ItemQuery, request_url: &Url, payload: &Value) -> Option<ProductMatch> {
        let results = match &self.fields.results_path {
            Some(path) => value_at(payload, path)?,
            None => payload,
        };
        let first = match results {
            Value::Array(items) => items.first()?,
            Value::Object(_) => results,
            _ => return None,
        };

        let name = value_at(first, &self.fields.name_field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(item.as_str())
            .to_string();
        let price = value_at(first, &self.fields.price_field).and_then(price_from);

        let url = self
            .fields
            .url_field
            .as_deref()
            .and_then(|field| value_at(first, field))
            .and_then(Value::as_str)
            .and_then(|href| match &self.fields.url_prefix {
                Some(prefix) => Some(format!("{}{}", prefix, href.trim())),
                None => resolve_link(request_url, href),
            });

        Some(ProductMatch::found(
            self.endpoint.store.clone(),
            item.clone(),
            name,
            price,
            url,
        ))
    }

    async fn fetch(&self, item: &ItemQuery) -> Result<Option<ProductMatch>> {
        let (request_url, response) = self.endpoint.search(item).await?;
        let payload: Value = response.json().await?;
        Ok(self.extract(item, &request_url, &payload))
    }
}

#[async_trait]
impl SourceAdapter for JsonStoreAdapter {
    fn store(&self) -> &StoreId {
        &self.endpoint.store
    }

    fn timeout(&self) -> Duration {
        self.endpoint.timeout
    }

    async fn lookup(&self, item: &ItemQuery) -> ProductMatch {
        match self.fetch(item).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                tracing::debug!("{}: no search results for '{}'", self.store(), item);
                ProductMatch::miss(self.store().clone(), item.clone())
            }
            Err(e) => {
                tracing::warn!("⚠️ {}: lookup for '{}' failed: {}", self.store(), item, e);
                ProductMatch::miss(self.store().clone(), item.clone())
            }
        }
    }
}
