//! Actor middleware.
//!
//! Every request passes through here before a handler runs. A valid
//! `Authorization: Bearer <token>` header becomes `Actor::User`; no
//! header at all becomes `Actor::Anonymous`. A present-but-invalid
//! token is rejected with 401 immediately, so handlers never mistake
//! a bad credential for an anonymous caller.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use catalog_auth::service::AuthService;
use catalog_core::{Actor, ServiceError, UserIdentity};

pub async fn actor_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let bearer = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    let actor = match bearer {
        Some(token) => {
            let claims = auth.verify_token(&token)?;
            Actor::User(UserIdentity {
                id: claims.sub,
                username: claims.username,
                is_superuser: claims.is_superuser,
            })
        }
        None => Actor::Anonymous,
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
