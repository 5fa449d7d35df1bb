use rust_decimal::Decimal;

use catalog_core::{merge_patch, new_id, now_rfc3339, ListParams, ListResult, ServiceError};
use catalog_sql::Value;

use crate::model::{Product, ProductInput};
use super::CatalogService;

/// `price` allows 10 digits total, 2 of them fractional, so the integer
/// part is bounded by 10^8.
const PRICE_INTEGER_BOUND: i64 = 100_000_000;

const NAME_MAX: usize = 100;

impl CatalogService {
    pub fn create_product(&self, input: ProductInput) -> Result<Product, ServiceError> {
        self.validate_product(&input)?;

        let now = now_rfc3339();
        let product = Product {
            id: new_id(),
            sku: input.sku,
            name: input.name,
            price: input.price,
            description: input.description,
            brands: input.brands,
            created_at: now.clone(),
            updated_at: now,
        };

        self.insert_record("products", &product.id, &product, &product_indexes(&product))?;
        let product = self.detach_missing_brands(product)?;
        self.notifier.product_changed(&product);
        Ok(product)
    }

    pub fn get_product(&self, id: &str) -> Result<Product, ServiceError> {
        self.get_record("products", id)
    }

    pub fn list_products(&self, params: &ListParams) -> Result<ListResult<Product>, ServiceError> {
        let (items, total) = self.list_records("products", params)?;
        Ok(ListResult::new(items, total, params))
    }

    /// Full replacement (PUT). `id` and `created_at` are preserved.
    pub fn replace_product(&self, id: &str, input: ProductInput) -> Result<Product, ServiceError> {
        self.validate_product(&input)?;
        let current: Product = self.get_record("products", id)?;

        let product = Product {
            id: current.id,
            sku: input.sku,
            name: input.name,
            price: input.price,
            description: input.description,
            brands: input.brands,
            created_at: current.created_at,
            updated_at: now_rfc3339(),
        };

        self.update_record("products", id, &product, &product_indexes(&product))?;
        let product = self.detach_missing_brands(product)?;
        self.notifier.product_changed(&product);
        Ok(product)
    }

    /// Partial update (PATCH) with JSON merge-patch semantics.
    pub fn patch_product(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Product, ServiceError> {
        let current: Product = self.get_record("products", id)?;

        let mut base =
            serde_json::to_value(&current).map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        // id and created_at are immutable.
        base["id"] = serde_json::json!(current.id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["updated_at"] = serde_json::json!(now_rfc3339());

        let product: Product = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        self.validate_product(&ProductInput {
            sku: product.sku,
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            brands: product.brands.clone(),
        })?;

        self.update_record("products", id, &product, &product_indexes(&product))?;
        let product = self.detach_missing_brands(product)?;
        self.notifier.product_changed(&product);
        Ok(product)
    }

    /// Delete a product. The query counter row cascades away with it;
    /// no change notification is sent.
    pub fn delete_product(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("products", id)
    }

    /// A brand deletion can land between validation and the write, after
    /// `delete_brand`'s scrub pass has already scanned. Re-check the
    /// association afterwards and drop ids that no longer resolve.
    pub(crate) fn detach_missing_brands(&self, mut product: Product) -> Result<Product, ServiceError> {
        let mut kept = Vec::with_capacity(product.brands.len());
        for brand_id in &product.brands {
            if self.brand_exists(brand_id)? {
                kept.push(brand_id.clone());
            }
        }
        if kept.len() != product.brands.len() {
            product.brands = kept;
            product.updated_at = now_rfc3339();
            let id = product.id.clone();
            self.update_record("products", &id, &product, &product_indexes(&product))?;
        }
        Ok(product)
    }

    fn validate_product(&self, input: &ProductInput) -> Result<(), ServiceError> {
        if input.name.is_empty() {
            return Err(ServiceError::Validation("name must not be empty".into()));
        }
        if input.name.chars().count() > NAME_MAX {
            return Err(ServiceError::Validation(format!(
                "name exceeds {NAME_MAX} characters"
            )));
        }
        if input.price != input.price.round_dp(2) {
            return Err(ServiceError::Validation(
                "price allows at most 2 decimal places".into(),
            ));
        }
        if input.price.abs() >= Decimal::from(PRICE_INTEGER_BOUND) {
            return Err(ServiceError::Validation(
                "price exceeds 10 total digits".into(),
            ));
        }
        for brand_id in &input.brands {
            if !self.brand_exists(brand_id)? {
                return Err(ServiceError::Validation(format!(
                    "unknown brand '{brand_id}'"
                )));
            }
        }
        Ok(())
    }
}

fn product_indexes(p: &Product) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::Text(p.name.clone())),
        ("sku", Value::Integer(p.sku as i64)),
        ("price", Value::Text(p.price.to_string())),
        ("created_at", Value::Text(p.created_at.clone())),
        ("updated_at", Value::Text(p.updated_at.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use catalog_core::ListParams;

    use crate::model::{BrandInput, ProductInput};
    use crate::service::test_support::test_service;

    fn widget(brands: Vec<String>) -> ProductInput {
        ProductInput {
            sku: 10,
            name: "Widget".into(),
            price: "9.99".parse().unwrap(),
            description: "x".into(),
            brands,
        }
    }

    #[test]
    fn product_crud() {
        let svc = test_service();
        let brand = svc.create_brand(BrandInput { name: "Acme".into() }).unwrap();

        let created = svc.create_product(widget(vec![brand.id.clone()])).unwrap();
        assert_eq!(created.id.len(), 32);
        assert_eq!(created.sku, 10);
        assert!(!created.created_at.is_empty());

        let fetched = svc.get_product(&created.id).unwrap();
        assert_eq!(fetched.name, "Widget");
        assert_eq!(fetched.brands, vec![brand.id.clone()]);

        let replaced = svc
            .replace_product(
                &created.id,
                ProductInput {
                    sku: 10,
                    name: "Widget".into(),
                    price: "12.50".parse().unwrap(),
                    description: "x".into(),
                    brands: vec![brand.id.clone()],
                },
            )
            .unwrap();
        assert_eq!(replaced.price, "12.50".parse().unwrap());
        assert_eq!(replaced.created_at, created.created_at);

        let patched = svc
            .patch_product(&created.id, serde_json::json!({"name": "Widget II"}))
            .unwrap();
        assert_eq!(patched.name, "Widget II");
        assert_eq!(patched.price, "12.50".parse().unwrap());

        svc.delete_product(&created.id).unwrap();
        assert!(svc.get_product(&created.id).is_err());
    }

    #[test]
    fn unknown_product_is_not_found() {
        let svc = test_service();
        let err = svc.get_product("missing").unwrap_err();
        assert!(matches!(err, catalog_core::ServiceError::NotFound(_)));
    }

    #[test]
    fn unknown_brand_is_rejected() {
        let svc = test_service();
        let err = svc.create_product(widget(vec!["nope".into()])).unwrap_err();
        assert!(matches!(err, catalog_core::ServiceError::Validation(_)));
    }

    #[test]
    fn brands_lost_to_a_racing_delete_are_detached() {
        let svc = test_service();
        let brand = svc.create_brand(BrandInput { name: "Acme".into() }).unwrap();
        let created = svc.create_product(widget(vec![brand.id.clone()])).unwrap();

        // A brand deletion whose scrub pass scanned before this row
        // landed: the row is gone but the product still holds the id.
        svc.sql
            .exec(
                "DELETE FROM brands WHERE id = ?1",
                &[catalog_sql::Value::Text(brand.id.clone())],
            )
            .unwrap();

        let cleaned = svc.detach_missing_brands(created).unwrap();
        assert!(cleaned.brands.is_empty());
        assert!(svc.get_product(&cleaned.id).unwrap().brands.is_empty());
    }

    #[test]
    fn name_and_price_bounds() {
        let svc = test_service();

        let mut input = widget(vec![]);
        input.name = "x".repeat(101);
        assert!(svc.create_product(input).is_err());

        let mut input = widget(vec![]);
        input.price = "9.999".parse().unwrap();
        assert!(svc.create_product(input).is_err());

        let mut input = widget(vec![]);
        input.price = "123456789.00".parse().unwrap();
        assert!(svc.create_product(input).is_err());
    }

    #[test]
    fn list_is_paginated_in_creation_order() {
        let svc = test_service();
        for i in 0..12 {
            let mut input = widget(vec![]);
            input.name = format!("P{i:02}");
            svc.create_product(input).unwrap();
        }

        let page1 = svc.list_products(&ListParams::default()).unwrap();
        assert_eq!(page1.total, 12);
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.items[0].name, "P00");

        let page2 = svc
            .list_products(&ListParams { page: 2, page_size: 10 })
            .unwrap();
        assert_eq!(page2.items.len(), 2);
        assert_eq!(page2.items[0].name, "P10");

        let clamped = svc
            .list_products(&ListParams { page: 1, page_size: 100 })
            .unwrap();
        assert_eq!(clamped.page_size, 25);
    }

    #[test]
    fn writes_fire_the_notifier_deletes_do_not() {
        use std::sync::Arc;

        use catalog_sql::sqlite::SqliteStore;

        use crate::model::Product;
        use crate::notify::ChangeNotifier;
        use crate::service::CatalogService;

        #[derive(Default)]
        struct RecordingNotifier(std::sync::Mutex<Vec<String>>);
        impl ChangeNotifier for RecordingNotifier {
            fn product_changed(&self, p: &Product) {
                self.0.lock().unwrap().push(p.id.clone());
            }
        }

        let notifier = Arc::new(RecordingNotifier::default());
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let svc = CatalogService::new(sql, notifier.clone()).unwrap();

        let p = svc.create_product(widget(vec![])).unwrap();
        svc.replace_product(&p.id, widget(vec![])).unwrap();
        svc.patch_product(&p.id, serde_json::json!({"description": "y"})).unwrap();
        svc.add_inventory(&p.id, 5).unwrap();
        svc.remove_inventory(&p.id, 2).unwrap();
        assert_eq!(notifier.0.lock().unwrap().len(), 5);

        svc.delete_product(&p.id).unwrap();
        assert_eq!(notifier.0.lock().unwrap().len(), 5);
    }

    #[test]
    fn patch_cannot_change_identity() {
        let svc = test_service();
        let created = svc.create_product(widget(vec![])).unwrap();
        let patched = svc
            .patch_product(&created.id, serde_json::json!({"id": "other", "created_at": "1999"}))
            .unwrap();
        assert_eq!(patched.id, created.id);
        assert_eq!(patched.created_at, created.created_at);
    }
}
