//! Email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send HTML
//! account emails. Configuration is loaded from environment variables; if
//! `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and no
//! mailer should be constructed.

use crate::templates::{self, MailMessage};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "System <noreply@authgate.local>";

/// Default base URL for links embedded in emails.
const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Base URL that verification and reset links point at.
    pub client_url: String,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                           |
    /// |-----------------|----------|-----------------------------------|
    /// | `SMTP_HOST`     | yes      | --                                |
    /// | `SMTP_PORT`     | no       | `587`                             |
    /// | `SMTP_FROM`     | no       | `System <noreply@authgate.local>` |
    /// | `SMTP_USER`     | no       | --                                |
    /// | `SMTP_PASSWORD` | no       | --                                |
    /// | `CLIENT_URL`    | no       | `http://localhost:3000`           |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| DEFAULT_CLIENT_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends account emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send the address-verification email carrying `token`.
    pub async fn send_verify_email(&self, to_email: &str, token: &str) -> Result<(), EmailError> {
        let message = templates::verify_email(&self.config.client_url, token);
        self.deliver(to_email, &message).await
    }

    /// Send the password-reset email carrying `token`.
    pub async fn send_reset_password_email(
        &self,
        to_email: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let message = templates::reset_password(&self.config.client_url, token);
        self.deliver(to_email, &message).await
    }

    /// Send a rendered message to the specified address.
    pub async fn deliver(&self, to_email: &str, message: &MailMessage) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, subject = %message.subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
