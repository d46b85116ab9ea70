use crate::domain::model::{ItemQuery, ShoppingList};
use crate::utils::error::{BasketError, Result};

/// Characters that separate items in a pasted shopping list.
pub const SEPARATORS: [char; 5] = ['\n', ',', '•', '-', '*'];

/// Splits free-form list text into item queries, keeping input order.
pub fn parse(raw: &str) -> Result<ShoppingList> {
    let items: Vec<ItemQuery> = raw.split(SEPARATORS).filter_map(ItemQuery::new).collect();

    if items.is_empty() {
        return Err(BasketError::EmptyList);
    }

    tracing::debug!("Parsed {} item(s) from shopping list", items.len());
    Ok(ShoppingList::new(items))
}
