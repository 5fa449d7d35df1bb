use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::SmtpTransport;
use lettre::{Message, Transport};

use crate::{Email, MailError, Mailer};

/// SMTP transport configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    /// Username/password for SMTP AUTH. None for open relays.
    pub credentials: Option<(String, String)>,
    /// Upgrade the connection with STARTTLS. Plaintext otherwise
    /// (local relays only).
    pub starttls: bool,
}

/// Mailer backed by lettre's blocking SMTP transport.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let mut builder = if config.starttls {
            SmtpTransport::starttls_relay(&config.host)
                .map_err(|e| MailError::Permanent(format!("SMTP relay setup: {e}")))?
        } else {
            SmtpTransport::builder_dangerous(&config.host)
        };
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let Some((user, pass)) = &config.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self { transport: builder.build() })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|e| MailError::Permanent(format!("bad sender address: {e}")))?;

        let mut builder = Message::builder().from(from).subject(&email.subject);
        for addr in &email.to {
            let to: Mailbox = addr
                .parse()
                .map_err(|e| MailError::Permanent(format!("bad recipient '{addr}': {e}")))?;
            builder = builder.to(to);
        }
        let message = builder
            .body(email.body.clone())
            .map_err(|e| MailError::Permanent(format!("message build: {e}")))?;

        let result = self.transport.send(&message);
        if result.is_ok() {
            tracing::debug!(to = ?email.to, subject = %email.subject, "message accepted");
        }
        result.map(|_| ()).map_err(|e| {
            // 4xx responses and timeouts are worth an immediate retry.
            if e.is_transient() || e.is_timeout() {
                MailError::Transient(e.to_string())
            } else {
                MailError::Permanent(e.to_string())
            }
        })
    }
}
