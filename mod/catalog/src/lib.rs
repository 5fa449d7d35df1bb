pub mod api;
pub mod model;
pub mod notify;
pub mod service;

use std::sync::Arc;

use axum::Router;
use catalog_core::Module;

use service::CatalogService;

/// Catalog module — products, brands, inventory and query counting.
pub struct CatalogModule {
    service: Arc<CatalogService>,
}

impl CatalogModule {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self { service }
    }
}

impl Module for CatalogModule {
    fn name(&self) -> &str {
        "catalog"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
