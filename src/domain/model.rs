use crate::domain::money::Money;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One requested product, trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemQuery(String);

impl ItemQuery {
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered item queries for one request. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShoppingList {
    items: Vec<ItemQuery>,
}

impl ShoppingList {
    pub fn new(items: Vec<ItemQuery>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ItemQuery] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Canonical cache key. Order-sensitive; items cannot contain `\n`
    /// after parsing, so joining on it is unambiguous.
    pub fn cache_key(&self) -> String {
        self.items
            .iter()
            .map(ItemQuery::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Store display name plus its registration position, which breaks ties
/// when two baskets cost the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StoreId {
    pub name: String,
    pub index: usize,
}

impl StoreId {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One adapter's answer for one item query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductMatch {
    pub query: ItemQuery,
    pub name: String,
    pub price: Option<Money>,
    pub store: StoreId,
    pub url: Option<String>,
}

impl ProductMatch {
    pub fn found(
        store: StoreId,
        query: ItemQuery,
        name: impl Into<String>,
        price: Option<Money>,
        url: Option<String>,
    ) -> Self {
        Self {
            query,
            name: name.into(),
            price,
            store,
            url,
        }
    }

    /// Failure shape: the query text stands in for the product name.
    pub fn miss(store: StoreId, query: ItemQuery) -> Self {
        Self {
            name: query.as_str().to_string(),
            query,
            price: None,
            store,
            url: None,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.price.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreResult {
    pub store: StoreId,
    pub items: Vec<ProductMatch>,
    pub total: Money,
    /// Items listed without a price. They add nothing to `total`.
    pub unpriced: usize,
}

impl StoreResult {
    pub fn from_matches(store: StoreId, items: Vec<ProductMatch>) -> Self {
        let total = items.iter().filter_map(|m| m.price).sum();
        let unpriced = items.iter().filter(|m| !m.is_priced()).count();
        Self {
            store,
            items,
            total,
            unpriced,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unpriced == 0
    }
}

/// Per-store results, cheapest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedResultSet {
    stores: Vec<StoreResult>,
    pub generated_at: DateTime<Utc>,
}

impl RankedResultSet {
    /// Orders by total, then by store registration order.
    pub fn rank(mut stores: Vec<StoreResult>) -> Self {
        stores.sort_by(|a, b| {
            a.total
                .cmp(&b.total)
                .then_with(|| a.store.index.cmp(&b.store.index))
        });
        Self {
            stores,
            generated_at: Utc::now(),
        }
    }

    pub fn stores(&self) -> &[StoreResult] {
        &self.stores
    }

    pub fn cheapest(&self) -> Option<&StoreResult> {
        self.stores.first()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
