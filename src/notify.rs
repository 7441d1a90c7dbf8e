//! Notification collaborator: outbound confirmation email.
//!
//! The core only needs "deliver this and tell me if it worked". `SmtpNotifier`
//! is the production transport: lettre over implicit-TLS SMTP.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

use crate::error::NotifyError;

/// Delivers a plain-text message. Returns whether delivery succeeded.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool;
}

/// SMTP configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl EmailConfig {
    /// Returns `None` if no SMTP username is set (email disabled).
    ///
    /// `GMAIL_USER` / `GMAIL_PASSWORD` are honoured as fallbacks.
    pub fn from_env() -> Option<Self> {
        let username = std::env::var("EMAIL_SMTP_USERNAME")
            .or_else(|_| std::env::var("GMAIL_USER"))
            .ok()
            .filter(|s| !s.trim().is_empty())?;

        let password = std::env::var("EMAIL_SMTP_PASSWORD")
            .or_else(|_| std::env::var("GMAIL_PASSWORD"))
            .unwrap_or_default();

        let smtp_host =
            std::env::var("EMAIL_SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());

        let smtp_port: u16 = std::env::var("EMAIL_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(465);

        let from_address =
            std::env::var("EMAIL_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Some(Self {
            smtp_host,
            smtp_port,
            username,
            password: SecretString::from(password),
            from_address,
        })
    }
}

/// Sends mail through an SMTP relay.
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.config.from_address.parse().map_err(|e| {
                NotifyError::InvalidAddress {
                    address: self.config.from_address.clone(),
                    reason: format!("{e}"),
                }
            })?)
            .to(to.parse().map_err(|e| NotifyError::InvalidAddress {
                address: to.to_string(),
                reason: format!("{e}"),
            })?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    fn deliver(config: &EmailConfig, email: &Message) -> Result<(), NotifyError> {
        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        transport
            .send(email)
            .map_err(|e| NotifyError::Transport(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        let email = match self.build_message(recipient, subject, body) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(recipient, error = %e, "Confirmation email rejected before sending");
                return false;
            }
        };

        let config = self.config.clone();
        let result = tokio::task::spawn_blocking(move || Self::deliver(&config, &email)).await;

        match result {
            Ok(Ok(())) => {
                tracing::info!(recipient, "Email sent");
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(recipient, sender = %self.config.from_address, error = %e, "Email delivery failed");
                false
            }
            Err(e) => {
                tracing::error!(recipient, error = %e, "Email task panicked");
                false
            }
        }
    }
}

/// Notifier used when no SMTP account is configured. Every send fails.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, recipient: &str, _subject: &str, _body: &str) -> bool {
        tracing::warn!(recipient, "Email is not configured; dropping confirmation email");
        false
    }
}
