use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use catalog_core::{require_admin, Actor, ListParams, ListResult, ServiceError};

use crate::model::{Brand, BrandInput};
use super::AppState;

/// All brand routes are administrator-only.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list_brands).post(create_brand))
        .route(
            "/brands/{id}",
            get(get_brand)
                .put(replace_brand)
                .patch(patch_brand)
                .delete(delete_brand),
        )
}

async fn list_brands(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Brand>>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.list_brands(&params)?))
}

async fn create_brand(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<BrandInput>,
) -> Result<(StatusCode, Json<Brand>), ServiceError> {
    require_admin(&actor)?;
    let brand = svc.create_brand(input)?;
    Ok((StatusCode::CREATED, Json(brand)))
}

async fn get_brand(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Brand>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.get_brand(&id)?))
}

async fn replace_brand(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(input): Json<BrandInput>,
) -> Result<Json<Brand>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.replace_brand(&id, input)?))
}

async fn patch_brand(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Brand>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(svc.patch_brand(&id, patch)?))
}

async fn delete_brand(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    require_admin(&actor)?;
    svc.delete_brand(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
