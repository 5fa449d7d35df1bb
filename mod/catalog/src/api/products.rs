use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use catalog_core::{require_admin, Actor, ListParams, ListResult, ServiceError};

use crate::model::{Product, ProductInput, QueryCount};
use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product)
                .put(replace_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .route("/products/{id}/inventory/add", post(add_inventory))
        .route("/products/{id}/inventory/remove", post(remove_inventory))
        .route("/products/{id}/queries", get(get_queries))
}

#[derive(Deserialize)]
struct InventoryChange {
    quantity: u32,
}

async fn list_products(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Product>>, ServiceError> {
    Ok(Json(svc.list_products(&params)?))
}

async fn create_product(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ServiceError> {
    require_admin(&actor)?;
    let product = svc.create_product(input)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Retrieve a product. An anonymous retrieval bumps the query counter
/// before the response goes out; authenticated callers never touch it.
async fn get_product(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ServiceError> {
    let product = svc.get_product(&id)?;
    if !actor.is_authenticated() {
        svc.record_query(&id)?;
    }
    Ok(Json(product))
}

async fn replace_product(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.replace_product(&id, input)?))
}

async fn patch_product(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Product>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.patch_product(&id, patch)?))
}

async fn delete_product(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    require_admin(&actor)?;
    svc.delete_product(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_inventory(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(change): Json<InventoryChange>,
) -> Result<Json<Product>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.add_inventory(&id, change.quantity)?))
}

async fn remove_inventory(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(change): Json<InventoryChange>,
) -> Result<Json<Product>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.remove_inventory(&id, change.quantity)?))
}

async fn get_queries(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<QueryCount>, ServiceError> {
    require_admin(&actor)?;
    // 404 for unknown products rather than a zero count.
    svc.get_product(&id)?;
    Ok(Json(svc.query_count(&id)?))
}
