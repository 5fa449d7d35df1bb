use serde::{Deserialize, Serialize};

/// A product brand. Many-to-many with products via `Product::brands`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Brand name, at most 255 characters.
    pub name: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Payload for creating or replacing a brand.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandInput {
    pub name: String,
}
