//! Change notification — emails every administrator after a product write.
//!
//! The product service calls [`ChangeNotifier::product_changed`] right
//! after a durable create or update commit (never after a delete). The
//! mail implementation resolves its recipients at notification time
//! through an injected [`AdminDirectory`], so the notifier knows nothing
//! about user storage. Delivery failures are contained here: they are
//! logged and swallowed, never surfaced to the write path.

use std::sync::Arc;

use catalog_core::ServiceError;
use catalog_mail::{Email, Mailer};
use tracing::{error, warn};

use crate::model::Product;

/// Maximum delivery attempts per notification. Retries are immediate and
/// happen only for transient transport failures.
const MAX_ATTEMPTS: usize = 3;

/// Directory of administrator accounts, resolved at notification time.
pub trait AdminDirectory: Send + Sync {
    fn administrator_emails(&self) -> Result<Vec<String>, ServiceError>;
}

/// Post-write hook fired after a product is created or updated.
pub trait ChangeNotifier: Send + Sync {
    fn product_changed(&self, product: &Product);
}

/// Notifier used when no mail transport is configured, and in tests.
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn product_changed(&self, _product: &Product) {}
}

/// Emails all administrators that a product changed.
pub struct MailNotifier {
    mailer: Arc<dyn Mailer>,
    directory: Arc<dyn AdminDirectory>,
    from: String,
}

impl MailNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, directory: Arc<dyn AdminDirectory>, from: String) -> Self {
        Self { mailer, directory, from }
    }
}

impl ChangeNotifier for MailNotifier {
    fn product_changed(&self, product: &Product) {
        let recipients = match self.directory.administrator_emails() {
            Ok(emails) => emails,
            Err(e) => {
                error!(product = %product.id, error = %e, "could not resolve administrator emails");
                return;
            }
        };
        if recipients.is_empty() {
            return;
        }

        let email = Email {
            from: self.from.clone(),
            to: recipients,
            subject: format!("Product update: {}", product.name),
            body: format!("Product {} has been updated.", product.name),
        };

        for attempt in 1..=MAX_ATTEMPTS {
            match self.mailer.send(&email) {
                Ok(()) => return,
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        product = %product.id,
                        attempt,
                        error = %e,
                        "product change notification failed, retrying"
                    );
                }
                Err(e) => {
                    error!(
                        product = %product.id,
                        attempt,
                        error = %e,
                        "giving up on product change notification"
                    );
                    return;
                }
            }
        }
    }
}
