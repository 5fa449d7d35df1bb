//! Inventory ledger — the two stock-level mutations.
//!
//! Both are single SQL statements: the indexed `sku` column and the JSON
//! document are updated together with `json_set`, and the removal guard
//! (`AND sku >= ?`) makes check-then-set atomic per row. The store
//! serializes statements, so concurrent decrements cannot interleave past
//! the non-negative invariant.

use catalog_core::{now_rfc3339, ServiceError};
use catalog_sql::Value;

use crate::model::Product;
use super::CatalogService;

impl CatalogService {
    /// Add stock. Always succeeds for an existing product.
    pub fn add_inventory(&self, id: &str, quantity: u32) -> Result<Product, ServiceError> {
        let now = now_rfc3339();
        let affected = self
            .sql
            .exec(
                "UPDATE products
                 SET sku = sku + ?1,
                     data = json_set(data, '$.sku', sku + ?1, '$.updated_at', ?2),
                     updated_at = ?2
                 WHERE id = ?3",
                &[
                    Value::Integer(quantity as i64),
                    Value::Text(now),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("products/{id}")));
        }

        let product = self.get_product(id)?;
        self.notifier.product_changed(&product);
        Ok(product)
    }

    /// Remove stock. Fails with `InsufficientInventory` — and mutates
    /// nothing — when fewer than `quantity` units are on hand.
    pub fn remove_inventory(&self, id: &str, quantity: u32) -> Result<Product, ServiceError> {
        let now = now_rfc3339();
        let affected = self
            .sql
            .exec(
                "UPDATE products
                 SET sku = sku - ?1,
                     data = json_set(data, '$.sku', sku - ?1, '$.updated_at', ?2),
                     updated_at = ?2
                 WHERE id = ?3 AND sku >= ?1",
                &[
                    Value::Integer(quantity as i64),
                    Value::Text(now),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            // Unmatched guard: either the product is gone or the stock
            // is short. Look again to tell which.
            let product = self.get_product(id)?;
            return Err(ServiceError::InsufficientInventory(format!(
                "product '{}' has {} units, requested {}",
                id, product.sku, quantity
            )));
        }

        let product = self.get_product(id)?;
        self.notifier.product_changed(&product);
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ProductInput;
    use crate::service::test_support::test_service;

    fn seed(sku: u32) -> ProductInput {
        ProductInput {
            sku,
            name: "Widget".into(),
            price: "9.99".parse().unwrap(),
            description: "x".into(),
            brands: vec![],
        }
    }

    #[test]
    fn add_increases_stock() {
        let svc = test_service();
        let p = svc.create_product(seed(3)).unwrap();

        let updated = svc.add_inventory(&p.id, 4).unwrap();
        assert_eq!(updated.sku, 7);

        // The JSON document and the indexed column agree.
        assert_eq!(svc.get_product(&p.id).unwrap().sku, 7);
    }

    #[test]
    fn remove_decreases_stock() {
        let svc = test_service();
        let p = svc.create_product(seed(10)).unwrap();

        let updated = svc.remove_inventory(&p.id, 4).unwrap();
        assert_eq!(updated.sku, 6);

        let drained = svc.remove_inventory(&p.id, 6).unwrap();
        assert_eq!(drained.sku, 0);
    }

    #[test]
    fn remove_beyond_stock_fails_without_mutation() {
        let svc = test_service();
        let p = svc.create_product(seed(2)).unwrap();

        let err = svc.remove_inventory(&p.id, 3).unwrap_err();
        assert!(matches!(err, catalog_core::ServiceError::InsufficientInventory(_)));
        assert_eq!(svc.get_product(&p.id).unwrap().sku, 2);
    }

    #[test]
    fn inventory_on_missing_product_is_not_found() {
        let svc = test_service();
        assert!(matches!(
            svc.add_inventory("missing", 1).unwrap_err(),
            catalog_core::ServiceError::NotFound(_)
        ));
        assert!(matches!(
            svc.remove_inventory("missing", 1).unwrap_err(),
            catalog_core::ServiceError::NotFound(_)
        ));
    }

    #[test]
    fn concurrent_removals_never_go_negative() {
        use std::sync::Arc;

        let svc = test_service();
        let p = svc.create_product(seed(10)).unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let svc = Arc::clone(&svc);
            let id = p.id.clone();
            handles.push(std::thread::spawn(move || {
                let mut removed = 0u32;
                for _ in 0..5 {
                    if svc.remove_inventory(&id, 1).is_ok() {
                        removed += 1;
                    }
                }
                removed
            }));
        }
        let removed: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(removed, 10);
        assert_eq!(svc.get_product(&p.id).unwrap().sku, 0);
    }
}
