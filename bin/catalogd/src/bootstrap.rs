//! First-start checks and administrator account creation.

use std::sync::Arc;

use catalog_auth::service::AuthService;

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if let Some(mail) = &config.mail {
        if mail.effective_from().is_empty() {
            anyhow::bail!("Mail sender address is empty in configuration.");
        }
    }
    Ok(())
}

/// Create the bootstrap administrator if the section is present.
/// Idempotent across restarts.
pub fn ensure_admin(auth: &Arc<AuthService>, config: &ServerConfig) -> anyhow::Result<()> {
    if let Some(b) = &config.bootstrap {
        auth.ensure_admin(&b.admin_username, &b.admin_email, &b.admin_password)
            .map_err(|e| anyhow::anyhow!("bootstrap admin creation failed: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::{JwtConfig, ServerConfig, StorageConfig};
    use super::verify_config;

    fn base_config(secret: &str) -> ServerConfig {
        ServerConfig {
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expire_secs: 3600,
            },
            bootstrap: None,
            mail: None,
        }
    }

    #[test]
    fn empty_jwt_secret_is_rejected() {
        assert!(verify_config(&base_config("")).is_err());
        assert!(verify_config(&base_config("s3cret")).is_ok());
    }
}
