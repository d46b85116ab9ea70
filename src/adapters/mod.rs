// Adapters layer: concrete retailer lookups behind the SourceAdapter port.

pub mod html;
pub mod json;

use crate::config::toml_config::StoreConfig;
use crate::domain::model::{ItemQuery, StoreId};
use crate::domain::ports::SourceAdapter;
use crate::utils::error::{BasketError, Result};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub use html::HtmlStoreAdapter;
pub use json::JsonStoreAdapter;

/// Builds one adapter per configured store, in declaration order.
pub fn build_adapters(stores: &[StoreConfig], client: &Client) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    stores
        .iter()
        .enumerate()
        .map(|(index, store)| {
            let id = StoreId::new(store.name.trim(), index);
            let adapter: Arc<dyn SourceAdapter> = match store.r#type.as_str() {
                "html" => Arc::new(HtmlStoreAdapter::from_config(id, client.clone(), store)?),
                "json" => Arc::new(JsonStoreAdapter::from_config(id, client.clone(), store)?),
                other => {
                    return Err(BasketError::InvalidConfigValueError {
                        field: "stores.type".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported store type. Valid types: html, json".to_string(),
                    })
                }
            };
            tracing::debug!("Registered {} store adapter: {}", store.r#type, store.name);
            Ok(adapter)
        })
        .collect()
}

pub fn build_client(user_agent: &str) -> Result<Client> {
    Ok(Client::builder().user_agent(user_agent).build()?)
}

/// Puts the URL-encoded item text into a `{query}` search template.
pub fn fill_template(template: &str, item: &ItemQuery) -> Result<Url> {
    let encoded: String = url::form_urlencoded::byte_serialize(item.as_str().as_bytes()).collect();
    let endpoint = template.replace("{query}", &encoded);
    Url::parse(&endpoint).map_err(|e| BasketError::InvalidConfigValueError {
        field: "stores.search_url".to_string(),
        value: template.to_string(),
        reason: format!("Invalid URL after substitution: {}", e),
    })
}

/// Makes product links absolute relative to the page they came from.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// Shared request settings for one store's search endpoint.
#[derive(Debug, Clone)]
pub(crate) struct SearchEndpoint {
    pub store: StoreId,
    pub client: Client,
    pub template: String,
    pub timeout: Duration,
    pub headers: HashMap<String, String>,
}

impl SearchEndpoint {
    pub fn from_config(store: StoreId, client: Client, config: &StoreConfig) -> Self {
        Self {
            store,
            client,
            template: config.search_url.clone(),
            timeout: config.timeout(),
            headers: config.headers.clone().unwrap_or_default(),
        }
    }

    /// Sends the search request and insists on a 2xx answer.
    pub async fn search(&self, item: &ItemQuery) -> Result<(Url, Response)> {
        let url = fill_template(&self.template, item)?;

        let mut request = self.client.get(url.clone()).timeout(self.timeout);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        tracing::debug!("{}: GET {}", self.store, url);
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(BasketError::lookup(
                &self.store.name,
                format!("search request failed with status: {}", response.status()),
            ));
        }

        Ok((url, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::BasketConfig;

    #[test]
    fn test_fill_template_encodes_query() {
        let item = ItemQuery::new("full cream milk & eggs").unwrap();
        let url = fill_template("https://shop.test/search?q={query}", &item).unwrap();
        assert_eq!(
            url.as_str(),
            "https://shop.test/search?q=full+cream+milk+%26+eggs"
        );
    }

    #[test]
    fn test_resolve_link() {
        let base = Url::parse("https://shop.test/search?q=milk").unwrap();
        assert_eq!(
            resolve_link(&base, "/p/123"),
            Some("https://shop.test/p/123".to_string())
        );
        assert_eq!(
            resolve_link(&base, "https://cdn.test/x"),
            Some("https://cdn.test/x".to_string())
        );
        assert_eq!(resolve_link(&base, ""), None);
        assert_eq!(resolve_link(&base, "javascript:void(0)"), None);
    }

    #[test]
    fn test_build_adapters_keeps_declaration_order() {
        let config = BasketConfig::from_toml_str(
            r#"
[[stores]]
name = "Checkers"
type = "html"
search_url = "https://shop.test/search?q={query}"

[stores.html]
product_selector = ".product"
name_selector = ".name"
price_selector = ".price"

[[stores]]
name = "Woolworths"
type = "json"
search_url = "https://api.test/s?q={query}"

[stores.json]
name_field = "name"
price_field = "price"
"#,
        )
        .unwrap();
        let client = build_client("test-agent").unwrap();

        let adapters = build_adapters(&config.stores, &client).unwrap();

        assert_eq!(adapters.len(), 2);
        assert_eq!(adapters[0].store(), &StoreId::new("Checkers", 0));
        assert_eq!(adapters[1].store(), &StoreId::new("Woolworths", 1));
    }

    #[test]
    fn test_build_adapters_rejects_bad_selector() {
        let config = BasketConfig::from_toml_str(
            r#"
[[stores]]
name = "Checkers"
type = "html"
search_url = "https://shop.test/search?q={query}"

[stores.html]
product_selector = "div[["
name_selector = ".name"
price_selector = ".price"
"#,
        )
        .unwrap();
        let client = build_client("test-agent").unwrap();

        assert!(build_adapters(&config.stores, &client).is_err());
    }
}
