//! JWT issuance and validation (HS256).

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use catalog_core::ServiceError;

use crate::model::{Claims, User};

pub fn issue_token(secret: &str, user: &User, ttl_secs: i64) -> Result<String, ServiceError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        is_superuser: user.is_superuser,
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Internal(e.to_string()))
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ServiceError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ServiceError::Unauthorized("invalid or expired token".into()))
}

#[cfg(test)]
mod tests {
    use catalog_core::ServiceError;

    use crate::model::User;
    use super::{issue_token, verify_token};

    fn user() -> User {
        User {
            id: "u1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            is_staff: false,
            is_superuser: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn token_roundtrip() {
        let token = issue_token("secret", &user(), 3600).unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.username, "alice");
        assert!(claims.is_superuser);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", &user(), 3600).unwrap();
        assert!(matches!(
            verify_token("other", &token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("secret", &user(), -120).unwrap();
        assert!(verify_token("secret", &token).is_err());
    }
}
