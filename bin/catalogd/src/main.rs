//! `catalogd` — the product catalog server binary.
//!
//! Usage:
//!   catalogd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/catalog/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod directory;
mod middleware;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use catalog_auth::service::{AuthConfig, AuthService};
use catalog_auth::AuthModule;
use catalog_core::Module;
use catalog_mail::smtp::{SmtpConfig, SmtpMailer};
use catalog_mail::Mailer;
use catalog_products::notify::{ChangeNotifier, MailNotifier, NoopNotifier};
use catalog_products::service::CatalogService;
use catalog_products::CatalogModule;
use catalog_sql::{SQLStore, SqliteStore};

use config::ServerConfig;
use directory::AuthDirectory;

/// Product catalog server.
#[derive(Parser, Debug)]
#[command(name = "catalogd", about = "Product catalog server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let sql: Arc<dyn SQLStore> = Arc::new(
        SqliteStore::open(&data_dir.join("catalog.db"))
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let auth = AuthService::new(
        Arc::clone(&sql),
        AuthConfig {
            jwt_secret: server_config.jwt.secret.clone(),
            token_ttl_secs: server_config.jwt.expire_secs,
        },
    )
    .map_err(|e| anyhow::anyhow!("auth service init failed: {}", e))?;
    bootstrap::ensure_admin(&auth, &server_config)?;

    let notifier: Arc<dyn ChangeNotifier> = match &server_config.mail {
        Some(mail) => {
            let mailer: Arc<dyn Mailer> = Arc::new(
                SmtpMailer::new(&SmtpConfig {
                    host: mail.host.clone(),
                    port: mail.port,
                    credentials: match (&mail.username, &mail.password) {
                        (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
                        _ => None,
                    },
                    starttls: mail.starttls,
                })
                .map_err(|e| anyhow::anyhow!("SMTP transport setup failed: {}", e))?,
            );
            info!("Change notifications enabled via {}", mail.host);
            Arc::new(MailNotifier::new(
                mailer,
                Arc::new(AuthDirectory::new(Arc::clone(&auth))),
                mail.effective_from(),
            ))
        }
        None => {
            info!("No mail configuration; change notifications disabled");
            Arc::new(NoopNotifier)
        }
    };

    let catalog = CatalogService::new(Arc::clone(&sql), notifier)
        .map_err(|e| anyhow::anyhow!("catalog service init failed: {}", e))?;

    let auth_module = AuthModule::new(Arc::clone(&auth));
    let catalog_module = CatalogModule::new(catalog);
    let mut module_routes = Vec::new();
    for module in [&auth_module as &dyn Module, &catalog_module] {
        info!("{} module initialized", module.name());
        module_routes.push(module.routes());
    }

    let app = routes::build_router(auth, module_routes);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("catalogd listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
