//! Server configuration (TOML).
//!
//! The context name given to `-c` resolves to `/etc/catalog/<name>.toml`.
//! A value containing `/` or `.` is treated as a literal path.

use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable overriding the notification sender address.
pub const MAIL_FROM_ENV: &str = "CATALOG_MAIL_FROM";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,
    /// SMTP settings. When absent, product change notifications are
    /// disabled.
    #[serde(default)]
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: i64,
}

/// First-start administrator account, created if missing.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub admin_username: String,
    #[serde(default)]
    pub admin_email: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    /// Sender address for notifications.
    pub from: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_starttls")]
    pub starttls: bool,
}

fn default_expire_secs() -> i64 {
    24 * 3600
}

fn default_starttls() -> bool {
    true
}

impl ServerConfig {
    /// Resolve a context name or literal path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/catalog/{name_or_path}.toml"))
        }
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path.display(), e))?;
        Ok(config)
    }
}

impl MailConfig {
    /// Sender address, with the environment override applied.
    pub fn effective_from(&self) -> String {
        std::env::var(MAIL_FROM_ENV).unwrap_or_else(|_| self.from.clone())
    }
}
