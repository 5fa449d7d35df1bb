pub mod api;
pub mod model;
pub mod password;
pub mod service;
pub mod token;

use std::sync::Arc;

use axum::Router;
use catalog_core::Module;

use service::AuthService;

/// Auth module — user accounts and login.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
