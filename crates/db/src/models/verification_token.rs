//! Single-use verification token model (email verification, password reset).

use authgate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// What a verification token may be redeemed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationPurpose {
    EmailVerify,
    ResetPassword,
}

impl VerificationPurpose {
    /// Value stored in the `purpose` column.
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationPurpose::EmailVerify => "email_verify",
            VerificationPurpose::ResetPassword => "reset_password",
        }
    }
}

/// A row from the `verification_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationToken {
    pub id: DbId,
    pub user_id: DbId,
    pub purpose: String,
    pub email: String,
    pub token: String,
    pub is_used: bool,
    pub is_expired: bool,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VerificationToken {
    /// Whether the stored record itself has lapsed, independent of the
    /// signed token's own `exp` claim.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.is_expired || self.expires_at < now
    }
}

/// DTO for creating a new verification token.
#[derive(Debug, Clone)]
pub struct CreateVerificationToken {
    pub user_id: DbId,
    pub purpose: VerificationPurpose,
    pub email: String,
    pub token: String,
    pub expires_at: Timestamp,
}
