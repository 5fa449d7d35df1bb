pub mod error;
pub mod module;
pub mod policy;
pub mod types;

pub use error::ServiceError;
pub use module::Module;
pub use policy::{require_admin, Actor, UserIdentity};
pub use types::{merge_patch, new_id, now_rfc3339, ListParams, ListResult};
