//! Request identity and the access-policy decision functions.
//!
//! The HTTP layer does not decide anything: the auth middleware in the
//! server binary builds an [`Actor`] from the request's credentials and
//! handlers ask this module whether the actor may proceed. The policy is
//! deliberately flat — there is no per-object ownership, only a global
//! administrator check.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// An authenticated user's identity, as carried in the request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    pub is_superuser: bool,
}

/// The caller of a request: either a verified user or nobody.
///
/// An invalid credential never becomes `Anonymous` — the middleware
/// rejects it with 401 before a handler runs.
#[derive(Debug, Clone)]
pub enum Actor {
    Anonymous,
    User(UserIdentity),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::User(u) if u.is_superuser)
    }
}

/// Require an administrator.
///
/// Anonymous callers get `Unauthorized` (401), authenticated
/// non-administrators get `PermissionDenied` (403). Applied to all product
/// mutations and to every brand and user route.
pub fn require_admin(actor: &Actor) -> Result<(), ServiceError> {
    match actor {
        Actor::Anonymous => Err(ServiceError::Unauthorized(
            "authentication required".into(),
        )),
        Actor::User(u) if u.is_superuser => Ok(()),
        Actor::User(_) => Err(ServiceError::PermissionDenied(
            "administrator access required".into(),
        )),
    }
}
