use serde::{Deserialize, Serialize};

/// A user account as persisted. The argon2id hash never leaves storage;
/// API responses use [`UserView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Login name, unique, at most 150 characters.
    pub username: String,

    /// Email address. May be empty; empty addresses are skipped when
    /// resolving notification recipients.
    #[serde(default)]
    pub email: String,

    /// argon2id PHC string.
    pub password_hash: String,

    /// Staff flag, carried for compatibility; grants nothing by itself.
    #[serde(default)]
    pub is_staff: bool,

    /// Administrator flag. Gates all mutating and admin-only routes.
    #[serde(default)]
    pub is_superuser: bool,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Public projection of a [`User`] for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
            is_staff: u.is_staff,
            is_superuser: u.is_superuser,
            created_at: u.created_at.clone(),
            updated_at: u.updated_at.clone(),
        }
    }
}

/// Payload for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Payload for fully replacing a user (PUT). Omitting `password` keeps
/// the stored hash.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Login name.
    pub username: String,
    /// Administrator flag, mirrored into the token so the middleware
    /// can build an `Actor` without a user lookup.
    pub is_superuser: bool,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}
