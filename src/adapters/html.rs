//! Search-page scraping adapter.
//!
//! Fetches a store's search results page and reads the first product card
//! through configured CSS selectors. The selectors are the volatile part;
//! everything else stays the same across stores.

use crate::adapters::{resolve_link, SearchEndpoint};
use crate::config::toml_config::{HtmlSelectors, StoreConfig};
use crate::domain::model::{ItemQuery, ProductMatch, StoreId};
use crate::domain::money::Money;
use crate::domain::ports::SourceAdapter;
use crate::utils::error::{BasketError, Result};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
struct ProductSelectors {
    product: Selector,
    name: Selector,
    price: Selector,
    link: Option<Selector>,
}

impl ProductSelectors {
    fn compile(config: &HtmlSelectors) -> Result<Self> {
        Ok(Self {
            product: compile_selector("stores.html.product_selector", &config.product_selector)?,
            name: compile_selector("stores.html.name_selector", &config.name_selector)?,
            price: compile_selector("stores.html.price_selector", &config.price_selector)?,
            link: config
                .link_selector
                .as_deref()
                .map(|css| compile_selector("stores.html.link_selector", css))
                .transpose()?,
        })
    }
}

fn compile_selector(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| BasketError::InvalidConfigValueError {
        field: field.to_string(),
        value: css.to_string(),
        reason: format!("Invalid CSS selector: {:?}", e),
    })
}

/// Whitespace-normalised text content of an element.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct HtmlStoreAdapter {
    endpoint: SearchEndpoint,
    selectors: ProductSelectors,
}

impl HtmlStoreAdapter {
    pub fn from_config(store: StoreId, client: Client, config: &StoreConfig) -> Result<Self> {
        let selectors = validate_required_field("stores.html", &config.html)?;
        Ok(Self {
            selectors: ProductSelectors::compile(selectors)?,
            endpoint: SearchEndpoint::from_config(store, client, config),
        })
    }

    /// Reads the first product card on a search page.
    ///
    /// Returns `None` when the page has no product card at all. A card
    /// without a readable price still counts as a match with no price.
    pub fn extract(&self, item: &ItemQuery, page_url: &Url, body: &str) -> Option<ProductMatch> {
        let document = Html::parse_document(body);
        let card = document.select(&self.selectors.product).next()?;

        let name = card
            .select(&self.selectors.name)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| item.as_str().to_string());

        let price = card
            .select(&self.selectors.price)
            .next()
            .and_then(|el| Money::parse_display(&element_text(el)));

        let href = match &self.selectors.link {
            Some(link) => card.select(link).next().and_then(|a| a.value().attr("href")),
            None => card.value().attr("href"),
        };
        let url = href.and_then(|href| resolve_link(page_url, href));

        Some(ProductMatch::found(
            self.endpoint.store.clone(),
            item.clone(),
            name,
            price,
            url,
        ))
    }

    async fn fetch(&self, item: &ItemQuery) -> Result<Option<ProductMatch>> {
        let (page_url, response) = self.endpoint.search(item).await?;
        let body = response.text().await?;
        Ok(self.extract(item, &page_url, &body))
    }
}

#[async_trait]
impl SourceAdapter for HtmlStoreAdapter {
    fn store(&self) -> &StoreId {
        &self.endpoint.store
    }

    fn timeout(&self) -> Duration {
        self.endpoint.timeout
    }

    async fn lookup(&self, item: &ItemQuery) -> ProductMatch {
        match self.fetch(item).await {
            Ok(Some(found)) => {
                if found.price.is_none() {
                    tracing::debug!("{}: '{}' listed without a readable price", self.store(), item);
                }
                found
            }
            Ok(None) => {
                tracing::debug!("{}: no product card for '{}'", self.store(), item);
                ProductMatch::miss(self.store().clone(), item.clone())
            }
            Err(e) => {
                tracing::warn!("⚠️ {}: lookup for '{}' failed: {}", self.store(), item, e);
                ProductMatch::miss(self.store().clone(), item.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::BasketConfig;

    const PAGE: &str = r#"
<html><body>
  <div class="results">
    <div class="product">
      <a class="product__link" href="/p/10001">
        <h3 class="product__name">  Clover Full Cream
           Milk 2L </h3>
      </a>
      <span class="product__price">R 34,99</span>
    </div>
    <div class="product">
      <h3 class="product__name">Other milk</h3>
      <span class="product__price">R10.00</span>
    </div>
  </div>
</body></html>
"#;

    fn adapter(link_selector: Option<&str>) -> HtmlStoreAdapter {
        let link = link_selector
            .map(|css| format!("link_selector = \"{}\"\n", css))
            .unwrap_or_default();
        let config = BasketConfig::from_toml_str(&format!(
            r#"
[[stores]]
name = "Checkers"
type = "html"
search_url = "https://shop.test/search?q={{query}}"

[stores.html]
product_selector = ".product"
name_selector = ".product__name"
price_selector = ".product__price"
{}"#,
            link
        ))
        .unwrap();
        HtmlStoreAdapter::from_config(StoreId::new("Checkers", 0), Client::new(), &config.stores[0])
            .unwrap()
    }

    fn page_url() -> Url {
        Url::parse("https://shop.test/search?q=milk").unwrap()
    }

    #[test]
    fn test_extract_first_product_card() {
        let item = ItemQuery::new("milk").unwrap();
        let found = adapter(Some("a.product__link"))
            .extract(&item, &page_url(), PAGE)
            .unwrap();

        assert_eq!(found.name, "Clover Full Cream Milk 2L");
        assert_eq!(found.price, Some(Money::from_cents(3499)));
        assert_eq!(found.url.as_deref(), Some("https://shop.test/p/10001"));
        assert_eq!(found.store.name, "Checkers");
        assert_eq!(found.query, item);
    }

    #[test]
    fn test_extract_without_link_selector_has_no_url() {
        let item = ItemQuery::new("milk").unwrap();
        let found = adapter(None).extract(&item, &page_url(), PAGE).unwrap();
        assert_eq!(found.url, None);
    }

    #[test]
    fn test_extract_empty_results_page() {
        let item = ItemQuery::new("caviar").unwrap();
        let page = "<html><body><p>No results</p></body></html>";
        assert!(adapter(None).extract(&item, &page_url(), page).is_none());
    }

    #[test]
    fn test_extract_unreadable_price() {
        let item = ItemQuery::new("bread").unwrap();
        let page = r#"<div class="product"><h3 class="product__name">Bread</h3><span class="product__price">Out of stock</span></div>"#;
        let found = adapter(None).extract(&item, &page_url(), page).unwrap();
        assert_eq!(found.name, "Bread");
        assert_eq!(found.price, None);
    }
}
