use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// `sku` is the stock level, non-negative by construction. `brands` holds
/// the ids of associated [`super::Brand`]s and may be empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Units on hand.
    pub sku: u32,

    /// Display name, at most 100 characters.
    pub name: String,

    /// Unit price. At most 10 digits total, 2 of them fractional.
    pub price: Decimal,

    /// Free-form description.
    pub description: String,

    /// Associated brand ids.
    #[serde(default)]
    pub brands: Vec<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp. Refreshed on every write,
    /// inventory changes included.
    pub updated_at: String,
}

/// Payload for creating a product or fully replacing one (PUT).
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub sku: u32,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    #[serde(default, alias = "brand")]
    pub brands: Vec<String>,
}

/// Anonymous retrieval tally for one product.
#[derive(Debug, Clone, Serialize)]
pub struct QueryCount {
    pub product_id: String,
    pub count: u64,
}
