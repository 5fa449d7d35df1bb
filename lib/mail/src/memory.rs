use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Email, MailError, Mailer};

/// In-memory mailer for tests. Stores every accepted message and can be
/// scripted to fail the first N sends.
#[derive(Clone, Default)]
pub struct MemoryMailer {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    sent: Vec<Email>,
    failures: Vec<MailErrorKind>,
    attempts: usize,
}

#[derive(Clone, Copy)]
enum MailErrorKind {
    Transient,
    Permanent,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a transient failure for the next send attempt.
    pub fn fail_transient(&self, times: usize) {
        let mut inner = self.inner.lock();
        inner.failures.extend(std::iter::repeat(MailErrorKind::Transient).take(times));
    }

    /// Queue a permanent failure for the next send attempt.
    pub fn fail_permanent(&self, times: usize) {
        let mut inner = self.inner.lock();
        inner.failures.extend(std::iter::repeat(MailErrorKind::Permanent).take(times));
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<Email> {
        self.inner.lock().sent.clone()
    }

    /// Total send attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.inner.lock().attempts
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        let mut inner = self.inner.lock();
        inner.attempts += 1;
        if !inner.failures.is_empty() {
            let kind = inner.failures.remove(0);
            return Err(match kind {
                MailErrorKind::Transient => MailError::Transient("throttled".into()),
                MailErrorKind::Permanent => MailError::Permanent("rejected".into()),
            });
        }
        inner.sent.push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email {
            from: "noreply@example.com".into(),
            to: vec!["admin@example.com".into()],
            subject: "s".into(),
            body: "b".into(),
        }
    }

    #[test]
    fn records_sent_messages() {
        let mailer = MemoryMailer::new();
        mailer.send(&email()).unwrap();
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.attempts(), 1);
        assert_eq!(mailer.sent()[0].subject, "s");
    }

    #[test]
    fn scripted_failures_are_consumed_in_order() {
        let mailer = MemoryMailer::new();
        mailer.fail_transient(1);
        mailer.fail_permanent(1);

        let e1 = mailer.send(&email()).unwrap_err();
        assert!(e1.is_transient());
        let e2 = mailer.send(&email()).unwrap_err();
        assert!(!e2.is_transient());

        mailer.send(&email()).unwrap();
        assert_eq!(mailer.attempts(), 3);
        assert_eq!(mailer.sent().len(), 1);
    }
}
