//! Request and response shapes for hosts that expose comparisons over HTTP.
//!
//! Item prices and store totals both travel as formatted rand strings
//! (`"R12.50"`), with `null` for an item no store could price.

use crate::core::service::ComparisonService;
use crate::domain::model::{ProductMatch, RankedResultSet, StoreResult};
use crate::utils::error::BasketError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub shopping_list: String,
    /// Re-price even when a cached answer exists.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub name: String,
    pub price: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreView {
    pub store: String,
    pub total: String,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Status code plus JSON body, ready for whatever server framework hosts it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl From<&ProductMatch> for ItemView {
    fn from(found: &ProductMatch) -> Self {
        Self {
            name: found.name.clone(),
            price: found.price.map(|p| p.to_string()),
            url: found.url.clone(),
        }
    }
}

impl From<&StoreResult> for StoreView {
    fn from(result: &StoreResult) -> Self {
        Self {
            store: result.store.name.clone(),
            total: result.total.to_string(),
            items: result.items.iter().map(ItemView::from).collect(),
        }
    }
}

pub fn to_views(results: &RankedResultSet) -> Vec<StoreView> {
    results.stores().iter().map(StoreView::from).collect()
}

/// One row per store and item, stores in ranked order.
pub fn to_csv(results: &RankedResultSet) -> crate::utils::error::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["rank", "store", "store_total", "item", "product", "price", "url"])?;

    for (rank, store) in results.stores().iter().enumerate() {
        let rank = (rank + 1).to_string();
        let total = store.total.to_string();
        for found in &store.items {
            let price = found.price.map(|p| p.to_string()).unwrap_or_default();
            writer.write_record([
                rank.as_str(),
                store.store.name.as_str(),
                total.as_str(),
                found.query.as_str(),
                found.name.as_str(),
                price.as_str(),
                found.url.as_deref().unwrap_or(""),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BasketError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| BasketError::invalid_input(e.to_string()))
}

impl From<&BasketError> for ErrorBody {
    fn from(err: &BasketError) -> Self {
        Self {
            error: err.public_message(),
        }
    }
}

fn error_reply(err: &BasketError) -> ApiReply {
    if err.is_user_error() {
        tracing::info!("Rejected comparison request: {}", err);
    } else {
        tracing::error!("❌ Comparison failed: {}", err);
    }
    ApiReply {
        status: err.status_code(),
        body: serde_json::json!(ErrorBody::from(err)),
    }
}

/// Runs one comparison request and maps the outcome to a status and body.
pub async fn handle_compare(service: &ComparisonService, request: CompareRequest) -> ApiReply {
    let outcome = if request.refresh {
        service.refresh(&request.shopping_list).await
    } else {
        service.compare(&request.shopping_list).await
    };

    let results = match outcome {
        Ok(results) => results,
        Err(e) => return error_reply(&e),
    };

    match serde_json::to_value(to_views(&results)) {
        Ok(body) => ApiReply { status: 200, body },
        Err(e) => error_reply(&BasketError::from(e)),
    }
}
