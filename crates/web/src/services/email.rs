//! Outgoing mail.
//!
//! [`MailTransport`] is the seam the notification dispatcher sends through.
//! [`EmailService`] delivers over SMTP (STARTTLS) via lettre.

use std::future::Future;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crm_core::Email;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The transport refused the message without an SMTP exchange.
    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),
}

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Email,
    pub subject: String,
    pub body: String,
}

/// Something that can deliver an [`OutgoingEmail`].
pub trait MailTransport: Sync {
    /// Deliver one message. No retries.
    fn send(&self, email: &OutgoingEmail) -> impl Future<Output = Result<(), EmailError>> + Send;
}

/// SMTP delivery for notifications.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// No connection is made until the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(email.to.to_string()))?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?;

        Ok(message)
    }
}

impl MailTransport for EmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build_message(email)?;
        self.mailer.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

#[cfg(any(test, feature = "memory-store"))]
pub use recording::RecordingMailer;

#[cfg(any(test, feature = "memory-store"))]
mod recording {
    use std::sync::{Mutex, PoisonError};

    use super::{EmailError, MailTransport, OutgoingEmail};

    /// Transport that keeps every message in memory.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        failing: bool,
    }

    impl RecordingMailer {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A transport whose every send fails.
        #[must_use]
        pub fn failing() -> Self {
            Self {
                sent: Mutex::default(),
                failing: true,
            }
        }

        /// Messages delivered so far.
        #[must_use]
        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl MailTransport for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
            if self.failing {
                return Err(EmailError::Unavailable("connection refused".to_string()));
            }
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(email.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn service() -> EmailService {
        EmailService::new(&EmailConfig {
            smtp_host: "smtp.mailhost.test".to_string(),
            smtp_port: 2525,
            smtp_username: "crm".to_string(),
            smtp_password: SecretString::from("smtp-pass"),
            from_address: "CRM <crm@mailhost.test>".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_message_sets_headers() {
        let email = OutgoingEmail {
            to: Email::parse("rep@acme.test").unwrap(),
            subject: "New Call Scheduled: Intro".to_string(),
            body: "Hello,".to_string(),
        };

        let message = service().build_message(&email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: rep@acme.test"));
        assert!(raw.contains("Subject: New Call Scheduled: Intro"));
    }

    #[tokio::test]
    async fn test_bad_from_address_is_rejected() {
        let mut svc = service();
        svc.from_address = "not an address".to_string();
        let email = OutgoingEmail {
            to: Email::parse("rep@acme.test").unwrap(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(matches!(
            svc.build_message(&email),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
