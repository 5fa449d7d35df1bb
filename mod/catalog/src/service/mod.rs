pub mod brand;
pub mod inventory;
pub mod product;
pub mod queries;
pub mod schema;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use catalog_core::{ListParams, ServiceError};
use catalog_sql::{SQLStore, Value};

use crate::notify::ChangeNotifier;

/// Catalog service — owns the product/brand storage and the post-write
/// change notifier.
pub struct CatalogService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) notifier: Arc<dyn ChangeNotifier>,
}

impl CatalogService {
    /// Create the service, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Result<Arc<Self>, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, notifier }))
    }

    // ── Generic CRUD helpers ──
    //
    // Each table stores the full JSON document in a `data` column plus
    // indexed columns extracted for filtering and uniqueness.

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json =
            serde_json::to_string(record).map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut cols = vec!["id".to_string(), "data".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];
        for (col, val) in indexes {
            cols.push(col.to_string());
            params.push(val.clone());
        }
        let placeholders: Vec<String> =
            (1..=params.len()).map(|i| format!("?{i}")).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                ServiceError::Conflict(msg)
            } else {
                ServiceError::Storage(msg)
            }
        })?;
        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {table} WHERE id = ?1");
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("{table}/{id}")))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json =
            serde_json::to_string(record).map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];
        for (col, val) in indexes {
            params.push(val.clone());
            sets.push(format!("{} = ?{}", col, params.len()));
        }
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            params.len(),
        );

        let affected = self
            .sql
            .exec(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{table}/{id}")));
        }
        Ok(())
    }

    /// Delete a record by id.
    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), ServiceError> {
        let sql = format!("DELETE FROM {table} WHERE id = ?1");
        let affected = self
            .sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{table}/{id}")));
        }
        Ok(())
    }

    /// List one page of records in creation order, with the total count.
    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &ListParams,
    ) -> Result<(Vec<T>, usize), ServiceError> {
        let count_rows = self
            .sql
            .query(&format!("SELECT COUNT(*) AS cnt FROM {table}"), &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let sql = format!(
            "SELECT data FROM {table} ORDER BY created_at, rowid LIMIT ?1 OFFSET ?2"
        );
        let rows = self
            .sql
            .query(
                &sql,
                &[
                    Value::Integer(params.effective_page_size() as i64),
                    Value::Integer(params.offset() as i64),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            items.push(
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?,
            );
        }
        Ok((items, total))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use catalog_sql::sqlite::SqliteStore;

    use crate::notify::NoopNotifier;
    use super::CatalogService;

    pub fn test_service() -> Arc<CatalogService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        CatalogService::new(sql, Arc::new(NoopNotifier)).unwrap()
    }
}
