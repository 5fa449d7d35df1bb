pub mod brands;
pub mod products;

use std::sync::Arc;

use axum::Router;

use crate::service::CatalogService;

/// Shared application state for the catalog routes.
pub type AppState = Arc<CatalogService>;

/// Build the catalog API router. The caller mounts it under the API
/// prefix; the auth middleware in the binary has already placed an
/// `Actor` in the request extensions by the time these handlers run.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(products::routes())
        .merge(brands::routes())
        .with_state(state)
}
