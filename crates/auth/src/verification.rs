//! Email-verification and password-reset tokens.
//!
//! A user holds at most one live token per purpose: issuing a new one
//! deletes the previous record first, so an older link stops working as soon
//! as a newer one is sent. Redemption requires both a valid signature and an
//! unexpired stored record, and consumes the record.

use std::sync::Arc;

use authgate_core::error::CoreError;
use authgate_core::types::DbId;
use authgate_db::models::user::User;
use authgate_db::models::verification_token::{
    CreateVerificationToken, VerificationPurpose, VerificationToken,
};
use chrono::Utc;
use serde::Deserialize;

use crate::backend::BackendError;
use crate::password::{validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::ports::{MailDispatch, PasswordHasher, UserDirectory, VerificationTokenStore};
use crate::signer::{TokenPurpose, TokenSigner};

/// Body of a password-reset redemption.
#[derive(Clone, Deserialize)]
pub struct PasswordReset {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

fn token_purpose(purpose: VerificationPurpose) -> TokenPurpose {
    match purpose {
        VerificationPurpose::EmailVerify => TokenPurpose::EmailVerify,
        VerificationPurpose::ResetPassword => TokenPurpose::ResetPassword,
    }
}

/// Issues and redeems single-use verification tokens.
pub struct VerificationTokenManager {
    users: Arc<dyn UserDirectory>,
    tokens: Arc<dyn VerificationTokenStore>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<TokenSigner>,
    mailer: Arc<dyn MailDispatch>,
}

impl VerificationTokenManager {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        tokens: Arc<dyn VerificationTokenStore>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<TokenSigner>,
        mailer: Arc<dyn MailDispatch>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            signer,
            mailer,
        }
    }

    // -----------------------------------------------------------------------
    // Email verification
    // -----------------------------------------------------------------------

    /// Send a verification link to the account registered under `email`.
    pub async fn send_verify_email(&self, email: &str) -> Result<(), CoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::InvalidInput("Email is required".into()));
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(CoreError::NotFound { entity: "User" })?;

        if user.is_verified {
            return Err(CoreError::Conflict("Email already verified".into()));
        }

        let record = self.issue(&user, VerificationPurpose::EmailVerify).await?;
        self.mailer
            .send_verify_email(&user.email, &record.token)
            .await?;

        tracing::info!(user_id = %user.id, "Verification email sent");
        Ok(())
    }

    /// Redeem an email-verification token, marking its owner verified.
    pub async fn verify_email(&self, token: &str) -> Result<(), CoreError> {
        let (record, user) = self.redeem(token, VerificationPurpose::EmailVerify).await?;

        self.users.update_verified(user.id).await?;
        self.tokens.delete_by_id(record.id).await?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Password reset
    // -----------------------------------------------------------------------

    /// Send a password-reset link to the user's registered address.
    pub async fn send_reset_password(&self, user_id: DbId) -> Result<(), CoreError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(CoreError::NotFound { entity: "User" })?;

        let record = self.issue(&user, VerificationPurpose::ResetPassword).await?;
        self.mailer
            .send_reset_password_email(&user.email, &record.token)
            .await?;

        tracing::info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Redeem a reset token, replacing the owner's password hash.
    pub async fn reset_password(&self, input: &PasswordReset) -> Result<(), CoreError> {
        if input.token.trim().is_empty()
            || input.password.is_empty()
            || input.confirm_password.is_empty()
        {
            return Err(CoreError::InvalidInput(
                "Token, password and confirmation are required".into(),
            ));
        }
        if input.password != input.confirm_password {
            return Err(CoreError::InvalidInput("Passwords do not match".into()));
        }
        validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
            .map_err(CoreError::InvalidInput)?;

        let (record, user) = self
            .redeem(&input.token, VerificationPurpose::ResetPassword)
            .await?;

        let password_hash = self.hasher.hash(&input.password)?;
        self.users
            .update_password_hash(user.id, &password_hash)
            .await?;
        self.tokens.delete_by_id(record.id).await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Replace any live token of this purpose with a freshly signed one.
    async fn issue(
        &self,
        user: &User,
        purpose: VerificationPurpose,
    ) -> Result<VerificationToken, CoreError> {
        if let Some(existing) = self.tokens.find_by_user(user.id, purpose).await? {
            self.tokens.delete_by_id(existing.id).await?;
            tracing::debug!(user_id = %user.id, purpose = purpose.as_str(), "Previous token discarded");
        }

        let issued = self
            .signer
            .issue_default(token_purpose(purpose), &user.email)
            .map_err(BackendError::from)?;

        let record = self
            .tokens
            .insert(&CreateVerificationToken {
                user_id: user.id,
                purpose,
                email: user.email.clone(),
                token: issued.token,
                expires_at: issued.expires_at,
            })
            .await?;
        Ok(record)
    }

    /// Resolve a presented token to its record and owner, enforcing the
    /// signature, the stored expiry and the subject/owner match.
    async fn redeem(
        &self,
        token: &str,
        purpose: VerificationPurpose,
    ) -> Result<(VerificationToken, User), CoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CoreError::InvalidInput("Token is required".into()));
        }

        let record = self
            .tokens
            .find_by_token(token, purpose)
            .await?
            .ok_or(CoreError::NotFound { entity: "Token" })?;

        let subject = self
            .signer
            .validate(token_purpose(purpose), token)
            .ok_or_else(|| CoreError::Expired("Token is invalid or expired".into()))?;

        if record.is_expired_at(Utc::now()) {
            return Err(CoreError::Expired("Token has expired".into()));
        }

        let user = self
            .users
            .find_by_email(&subject)
            .await?
            .filter(|u| u.id == record.user_id)
            .ok_or_else(|| CoreError::InvalidInput("Token does not belong to this account".into()))?;

        Ok((record, user))
    }
}
