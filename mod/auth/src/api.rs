use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use catalog_core::{require_admin, Actor, ListParams, ListResult, ServiceError};

use crate::model::{CreateUser, ReplaceUser, UserView};
use crate::service::{AuthService, TokenGrant};

pub type AppState = Arc<AuthService>;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// User management is administrator-only; login is public.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        .route("/auth/login", post(login))
        .with_state(state)
}

async fn list_users(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<UserView>>, ServiceError> {
    require_admin(&actor)?;
    let page = svc.list_users(&params)?;
    Ok(Json(ListResult {
        items: page.items.iter().map(UserView::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    }))
}

async fn create_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserView>), ServiceError> {
    require_admin(&actor)?;
    let user = svc.create_user(input)?;
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

async fn get_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(UserView::from(&svc.get_user(&id)?)))
}

async fn replace_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(input): Json<ReplaceUser>,
) -> Result<Json<UserView>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(UserView::from(&svc.replace_user(&id, input)?)))
}

async fn patch_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<UserView>, ServiceError> {
    require_admin(&actor)?;
    Ok(Json(UserView::from(&svc.patch_user(&id, patch)?)))
}

async fn delete_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    require_admin(&actor)?;
    svc.delete_user(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn login(
    State(svc): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenGrant>, ServiceError> {
    Ok(Json(svc.login(&req.username, &req.password)?))
}
