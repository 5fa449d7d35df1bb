use catalog_core::ServiceError;
use catalog_sql::SQLStore;

/// SQL DDL statements to initialize the catalog schema.
///
/// Products and brands store the full JSON document in a `data` TEXT
/// column, with indexed columns extracted for filtering. `sku` is an
/// indexed INTEGER so inventory mutations can be one guarded UPDATE.
/// `product_queries` is a bare counter table; the foreign key cascades
/// the counter away when its product is deleted.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        sku INTEGER NOT NULL DEFAULT 0,
        price TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS brands (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS product_queries (
        product_id TEXT PRIMARY KEY REFERENCES products(id) ON DELETE CASCADE,
        count INTEGER NOT NULL DEFAULT 0
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_products_name ON products(name)",
    "CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_brands_name ON brands(name)",
];

/// Create all tables and indexes if they don't exist.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for ddl in SCHEMA {
        sql.exec(ddl, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {e}")))?;
    }
    Ok(())
}
