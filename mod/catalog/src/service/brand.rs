use catalog_core::{new_id, now_rfc3339, ListParams, ListResult, ServiceError};
use catalog_sql::Value;

use crate::model::{Brand, BrandInput};
use super::CatalogService;

const NAME_MAX: usize = 255;

impl CatalogService {
    pub fn create_brand(&self, input: BrandInput) -> Result<Brand, ServiceError> {
        validate_name(&input.name)?;

        let now = now_rfc3339();
        let brand = Brand {
            id: new_id(),
            name: input.name,
            created_at: now.clone(),
            updated_at: now,
        };

        self.insert_record("brands", &brand.id, &brand, &brand_indexes(&brand))?;
        Ok(brand)
    }

    pub fn get_brand(&self, id: &str) -> Result<Brand, ServiceError> {
        self.get_record("brands", id)
    }

    pub fn list_brands(&self, params: &ListParams) -> Result<ListResult<Brand>, ServiceError> {
        let (items, total) = self.list_records("brands", params)?;
        Ok(ListResult::new(items, total, params))
    }

    pub fn replace_brand(&self, id: &str, input: BrandInput) -> Result<Brand, ServiceError> {
        validate_name(&input.name)?;
        let current: Brand = self.get_record("brands", id)?;

        let brand = Brand {
            id: current.id,
            name: input.name,
            created_at: current.created_at,
            updated_at: now_rfc3339(),
        };
        self.update_record("brands", id, &brand, &brand_indexes(&brand))?;
        Ok(brand)
    }

    /// Partial update (PATCH) with JSON merge-patch semantics.
    pub fn patch_brand(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Brand, ServiceError> {
        let current: Brand = self.get_record("brands", id)?;

        let mut base =
            serde_json::to_value(&current).map_err(|e| ServiceError::Internal(e.to_string()))?;
        catalog_core::merge_patch(&mut base, &patch);
        // id and created_at are immutable.
        base["id"] = serde_json::json!(current.id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now_rfc3339());

        let brand: Brand =
            serde_json::from_value(base).map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_name(&brand.name)?;

        self.update_record("brands", id, &brand, &brand_indexes(&brand))?;
        Ok(brand)
    }

    /// Delete a brand, detaching it from every product that references it.
    pub fn delete_brand(&self, id: &str) -> Result<(), ServiceError> {
        // The association lives inside the product documents; scrub it
        // before the row goes away.
        let rows = self
            .sql
            .query("SELECT id, data FROM products", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let mut product: crate::model::Product = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            if product.brands.iter().any(|b| b == id) {
                product.brands.retain(|b| b != id);
                product.updated_at = now_rfc3339();
                let pid = product.id.clone();
                self.update_record(
                    "products",
                    &pid,
                    &product,
                    &[("updated_at", Value::Text(product.updated_at.clone()))],
                )?;
            }
        }

        self.delete_record("brands", id)
    }

    pub(crate) fn brand_exists(&self, id: &str) -> Result<bool, ServiceError> {
        let rows = self
            .sql
            .query("SELECT id FROM brands WHERE id = ?1", &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::Validation("name must not be empty".into()));
    }
    if name.chars().count() > NAME_MAX {
        return Err(ServiceError::Validation(format!("name exceeds {NAME_MAX} characters")));
    }
    Ok(())
}

fn brand_indexes(b: &Brand) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::Text(b.name.clone())),
        ("created_at", Value::Text(b.created_at.clone())),
        ("updated_at", Value::Text(b.updated_at.clone())),
    ]
}
