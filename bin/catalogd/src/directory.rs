//! Bridges the auth service into the catalog's notification recipients.

use std::sync::Arc;

use catalog_auth::service::AuthService;
use catalog_core::ServiceError;
use catalog_products::notify::AdminDirectory;

/// Resolves notification recipients from the user table at send time,
/// so newly created administrators are picked up without a restart.
pub struct AuthDirectory {
    auth: Arc<AuthService>,
}

impl AuthDirectory {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl AdminDirectory for AuthDirectory {
    fn administrator_emails(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.auth.administrator_emails())
    }
}
