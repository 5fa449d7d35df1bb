use std::sync::Arc;

use catalog_core::{
    merge_patch, new_id, now_rfc3339, ListParams, ListResult, ServiceError,
};
use catalog_sql::{SQLStore, Value};

use crate::model::{Claims, CreateUser, ReplaceUser, User};
use crate::password::{hash_password, verify_password};
use crate::token;

const USERNAME_MAX: usize = 150;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        username TEXT NOT NULL UNIQUE,
        is_superuser INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_users_superuser ON users (is_superuser)",
];

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for JWT signing.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 24 * 3600,
        }
    }
}

/// Granted access token, as returned by login.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Auth service — user accounts, credentials, and token issuance.
pub struct AuthService {
    sql: Arc<dyn SQLStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Arc<Self>, ServiceError> {
        for stmt in SCHEMA {
            sql.exec(stmt, &[])
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
        Ok(Arc::new(Self { sql, config }))
    }

    pub fn create_user(&self, input: CreateUser) -> Result<User, ServiceError> {
        validate_username(&input.username)?;
        if input.password.is_empty() {
            return Err(ServiceError::Validation("password must not be empty".into()));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            username: input.username,
            email: input.email,
            password_hash: hash_password(&input.password)
                .map_err(ServiceError::Internal)?,
            is_staff: input.is_staff,
            is_superuser: input.is_superuser,
            created_at: now.clone(),
            updated_at: now,
        };

        let json =
            serde_json::to_string(&user).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "INSERT INTO users (id, data, username, is_superuser, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                &[
                    Value::Text(user.id.clone()),
                    Value::Text(json),
                    Value::Text(user.username.clone()),
                    Value::Integer(user.is_superuser as i64),
                    Value::Text(user.created_at.clone()),
                    Value::Text(user.updated_at.clone()),
                ],
            )
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint") {
                    ServiceError::Conflict(format!(
                        "username '{}' is already taken",
                        user.username
                    ))
                } else {
                    ServiceError::Storage(msg)
                }
            })?;
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("users/{id}")))?;
        decode_user(row.get_str("data"))
    }

    pub fn find_by_username(&self, username: &str) -> Result<User, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("users/{username}")))?;
        decode_user(row.get_str("data"))
    }

    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<User>, ServiceError> {
        let count_rows = self
            .sql
            .query("SELECT COUNT(*) AS cnt FROM users", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let rows = self
            .sql
            .query(
                "SELECT data FROM users ORDER BY created_at, rowid LIMIT ?1 OFFSET ?2",
                &[
                    Value::Integer(params.effective_page_size() as i64),
                    Value::Integer(params.offset() as i64),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(decode_user(row.get_str("data"))?);
        }
        Ok(ListResult::new(items, total, params))
    }

    /// Full replacement (PUT). `id` and `created_at` are preserved; an
    /// omitted password keeps the stored hash.
    pub fn replace_user(&self, id: &str, input: ReplaceUser) -> Result<User, ServiceError> {
        validate_username(&input.username)?;
        let current = self.get_user(id)?;

        let password_hash = match input.password {
            Some(p) if !p.is_empty() => {
                hash_password(&p).map_err(ServiceError::Internal)?
            }
            Some(_) => {
                return Err(ServiceError::Validation("password must not be empty".into()))
            }
            None => current.password_hash,
        };

        let user = User {
            id: current.id,
            username: input.username,
            email: input.email,
            password_hash,
            is_staff: input.is_staff,
            is_superuser: input.is_superuser,
            created_at: current.created_at,
            updated_at: now_rfc3339(),
        };
        self.store_user(id, &user)?;
        Ok(user)
    }

    /// Partial update (PATCH) with JSON merge-patch semantics. A
    /// `password` member rehashes; the stored hash itself is not
    /// patchable.
    pub fn patch_user(
        &self,
        id: &str,
        mut patch: serde_json::Value,
    ) -> Result<User, ServiceError> {
        let current = self.get_user(id)?;

        let new_password = patch
            .as_object_mut()
            .and_then(|o| o.remove("password"))
            .and_then(|v| v.as_str().map(str::to_string));
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("password_hash");
        }

        let mut base =
            serde_json::to_value(&current).map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        // id, created_at, and the hash are immutable through the patch body.
        base["id"] = serde_json::json!(current.id);
        base["created_at"] = serde_json::json!(current.created_at);
        base["password_hash"] = serde_json::json!(current.password_hash);
        base["updated_at"] = serde_json::json!(now_rfc3339());

        let mut user: User = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_username(&user.username)?;

        if let Some(p) = new_password {
            if p.is_empty() {
                return Err(ServiceError::Validation("password must not be empty".into()));
            }
            user.password_hash = hash_password(&p).map_err(ServiceError::Internal)?;
        }

        self.store_user(id, &user)?;
        Ok(user)
    }

    pub fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec(
                "DELETE FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("users/{id}")));
        }
        Ok(())
    }

    /// Check a username/password pair and issue a token. The error is
    /// identical for an unknown user and a bad password.
    pub fn login(&self, username: &str, password: &str) -> Result<TokenGrant, ServiceError> {
        let user = self
            .find_by_username(username)
            .map_err(|_| bad_credentials())?;
        if !verify_password(password, &user.password_hash) {
            return Err(bad_credentials());
        }

        let access_token = token::issue_token(
            &self.config.jwt_secret,
            &user,
            self.config.token_ttl_secs,
        )?;
        Ok(TokenGrant {
            access_token,
            token_type: "Bearer",
            expires_in: self.config.token_ttl_secs,
        })
    }

    /// Decode and validate a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        token::verify_token(&self.config.jwt_secret, token)
    }

    /// Email addresses of all administrators, for change notifications.
    /// Accounts without an email are skipped.
    pub fn administrator_emails(&self) -> Vec<String> {
        let rows = match self
            .sql
            .query("SELECT data FROM users WHERE is_superuser = 1", &[])
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "administrator lookup failed");
                return Vec::new();
            }
        };
        rows.iter()
            .filter_map(|row| decode_user(row.get_str("data")).ok())
            .map(|u| u.email)
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// Create the administrator account if no user with that name
    /// exists yet. Idempotent; an existing account is left untouched.
    pub fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ServiceError> {
        match self.find_by_username(username) {
            Ok(_) => Ok(()),
            Err(ServiceError::NotFound(_)) => {
                let user = self.create_user(CreateUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    is_staff: true,
                    is_superuser: true,
                })?;
                tracing::info!(user = %user.username, "created administrator account");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn store_user(&self, id: &str, user: &User) -> Result<(), ServiceError> {
        let json =
            serde_json::to_string(user).map_err(|e| ServiceError::Internal(e.to_string()))?;
        let affected = self
            .sql
            .exec(
                "UPDATE users SET data = ?1, username = ?2, is_superuser = ?3, updated_at = ?4
                 WHERE id = ?5",
                &[
                    Value::Text(json),
                    Value::Text(user.username.clone()),
                    Value::Integer(user.is_superuser as i64),
                    Value::Text(user.updated_at.clone()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint") {
                    ServiceError::Conflict(format!(
                        "username '{}' is already taken",
                        user.username
                    ))
                } else {
                    ServiceError::Storage(msg)
                }
            })?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("users/{id}")));
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.is_empty() {
        return Err(ServiceError::Validation("username must not be empty".into()));
    }
    if username.chars().count() > USERNAME_MAX {
        return Err(ServiceError::Validation(format!(
            "username exceeds {USERNAME_MAX} characters"
        )));
    }
    Ok(())
}

fn decode_user(data: Option<&str>) -> Result<User, ServiceError> {
    let data = data.ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
    serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
}

fn bad_credentials() -> ServiceError {
    ServiceError::Unauthorized("invalid username or password".into())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use catalog_sql::sqlite::SqliteStore;

    use super::{AuthConfig, AuthService};

    pub fn test_service() -> Arc<AuthService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AuthService::new(
            sql,
            AuthConfig {
                jwt_secret: "test-secret".into(),
                token_ttl_secs: 3600,
            },
        )
        .unwrap()
    }
}
