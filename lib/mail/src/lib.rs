//! Outbound mail transport abstraction.
//!
//! The concrete transport is injected wherever mail is sent, the same way
//! the SQL store is: callers hold an `Arc<dyn Mailer>` and never know
//! whether it is SMTP or an in-memory test double. Errors classify
//! themselves as transient (worth an immediate retry) or permanent.

pub mod memory;
pub mod smtp;

pub use memory::MemoryMailer;
pub use smtp::{SmtpConfig, SmtpMailer};

use thiserror::Error;

/// A plain-text email message.
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail transport failure.
#[derive(Error, Debug)]
pub enum MailError {
    /// Throttling or timeout on the transport. Retrying immediately may
    /// succeed.
    #[error("transient delivery failure: {0}")]
    Transient(String),

    /// Rejected address, authentication failure, malformed message —
    /// retrying will not help.
    #[error("permanent delivery failure: {0}")]
    Permanent(String),
}

impl MailError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MailError::Transient(_))
    }
}

/// A mail transport. `send` blocks until the transport accepts or rejects
/// the message.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &Email) -> Result<(), MailError>;
}
