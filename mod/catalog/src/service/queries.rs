//! Query counter — per-product tally of anonymous retrievals.
//!
//! The counter row is created lazily by the first anonymous retrieve and
//! only ever incremented afterwards. Create-if-absent and increment are
//! one upsert, so concurrent anonymous reads cannot duplicate the row or
//! lose an update.

use catalog_core::ServiceError;
use catalog_sql::Value;

use crate::model::QueryCount;
use super::CatalogService;

impl CatalogService {
    /// Record one anonymous retrieval of `product_id`. Called on the read
    /// path before the response is produced; never for authenticated
    /// callers.
    pub fn record_query(&self, product_id: &str) -> Result<(), ServiceError> {
        match self.sql.exec(
            "INSERT INTO product_queries (product_id, count) VALUES (?1, 1)
             ON CONFLICT(product_id) DO UPDATE SET count = count + 1",
            &[Value::Text(product_id.to_string())],
        ) {
            Ok(_) => Ok(()),
            // A delete can land between the read and this upsert. The
            // counter row would cascade away regardless; a missing parent
            // is not an error on the read path.
            Err(e) if e.to_string().contains("FOREIGN KEY constraint") => Ok(()),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }

    /// Current tally for a product. Zero when no anonymous retrieval has
    /// happened yet.
    pub fn query_count(&self, product_id: &str) -> Result<QueryCount, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT count FROM product_queries WHERE product_id = ?1",
                &[Value::Text(product_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let count = rows.first().and_then(|r| r.get_i64("count")).unwrap_or(0);
        Ok(QueryCount {
            product_id: product_id.to_string(),
            count: count as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ProductInput;
    use crate::service::test_support::test_service;

    fn widget() -> ProductInput {
        ProductInput {
            sku: 1,
            name: "Widget".into(),
            price: "9.99".parse().unwrap(),
            description: "x".into(),
            brands: vec![],
        }
    }

    #[test]
    fn sequential_queries_count_exactly() {
        let svc = test_service();
        let p = svc.create_product(widget()).unwrap();

        assert_eq!(svc.query_count(&p.id).unwrap().count, 0);
        for expected in 1..=3 {
            svc.record_query(&p.id).unwrap();
            assert_eq!(svc.query_count(&p.id).unwrap().count, expected);
        }
    }

    #[test]
    fn counters_are_per_product() {
        let svc = test_service();
        let a = svc.create_product(widget()).unwrap();
        let b = svc.create_product(widget()).unwrap();

        svc.record_query(&a.id).unwrap();
        svc.record_query(&a.id).unwrap();
        svc.record_query(&b.id).unwrap();

        assert_eq!(svc.query_count(&a.id).unwrap().count, 2);
        assert_eq!(svc.query_count(&b.id).unwrap().count, 1);
    }

    #[test]
    fn concurrent_queries_lose_no_updates() {
        use std::sync::Arc;

        let svc = test_service();
        let p = svc.create_product(widget()).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = Arc::clone(&svc);
            let id = p.id.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..5 {
                    svc.record_query(&id).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(svc.query_count(&p.id).unwrap().count, 40);

        // Exactly one counter row exists.
        let rows = svc
            .sql
            .query("SELECT COUNT(*) AS cnt FROM product_queries", &[])
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(1));
    }

    #[test]
    fn counting_a_just_deleted_product_is_a_no_op() {
        let svc = test_service();
        let p = svc.create_product(widget()).unwrap();
        svc.delete_product(&p.id).unwrap();

        // The retrieve already happened; losing the race to a delete must
        // not turn it into an error.
        svc.record_query(&p.id).unwrap();

        assert_eq!(svc.query_count(&p.id).unwrap().count, 0);
        let rows = svc
            .sql
            .query("SELECT COUNT(*) AS cnt FROM product_queries", &[])
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(0));
    }

    #[test]
    fn deleting_the_product_cascades_the_counter() {
        let svc = test_service();
        let p = svc.create_product(widget()).unwrap();
        svc.record_query(&p.id).unwrap();

        svc.delete_product(&p.id).unwrap();

        let rows = svc
            .sql
            .query("SELECT COUNT(*) AS cnt FROM product_queries", &[])
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(0));
    }
}
