use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (catalog, auth) implements this trait to register
/// its API endpoints. The binary entry point collects all modules and
/// merges their routes under the API prefix.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// The module's routes, already bound to its own state.
    fn routes(&self) -> Router;
}
