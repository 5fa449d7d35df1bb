//! Route registration — module routes under /api/v1 plus system endpoints.

use std::sync::Arc;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use catalog_auth::service::AuthService;

use crate::middleware::actor_middleware;

/// Build the complete router.
///
/// Module routers are already `Router<()>` (they called `.with_state()`
/// internally); they are merged under the API prefix. The actor
/// middleware wraps everything, system endpoints included.
pub fn build_router(auth: Arc<AuthService>, module_routes: Vec<Router>) -> Router {
    let mut api = Router::new();
    for router in module_routes {
        api = api.merge(router);
    }

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(auth, actor_middleware))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "catalogd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
