//! [`MailDispatch`] adapters.

use async_trait::async_trait;
use authgate_mail::EmailDelivery;

use crate::backend::BackendError;
use crate::ports::MailDispatch;

#[async_trait]
impl MailDispatch for EmailDelivery {
    async fn send_verify_email(&self, address: &str, token: &str) -> Result<(), BackendError> {
        Ok(EmailDelivery::send_verify_email(self, address, token).await?)
    }

    async fn send_reset_password_email(
        &self,
        address: &str,
        token: &str,
    ) -> Result<(), BackendError> {
        Ok(EmailDelivery::send_reset_password_email(self, address, token).await?)
    }
}

/// Stand-in used when SMTP is not configured: records that a message would
/// have been sent, without the token.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl MailDispatch for LogMailer {
    async fn send_verify_email(&self, address: &str, _token: &str) -> Result<(), BackendError> {
        tracing::info!(to = address, "SMTP not configured, verification email not sent");
        Ok(())
    }

    async fn send_reset_password_email(
        &self,
        address: &str,
        _token: &str,
    ) -> Result<(), BackendError> {
        tracing::info!(to = address, "SMTP not configured, reset email not sent");
        Ok(())
    }
}
