//! Faults raised by collaborators (database, cache, mailer, hasher, signer).
//!
//! Managers never hand a [`BackendError`] to their caller: the `From`
//! conversion below logs the original fault and folds it into
//! [`CoreError::Internal`], except for unique-constraint violations which
//! surface as [`CoreError::Conflict`].

use authgate_core::error::CoreError;

use crate::signer::SignerError;

/// Error type shared by every port implementation.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A query or connection failure from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {0}")]
    Duplicate(String),

    /// A Redis command failed.
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A cached value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SMTP delivery failed.
    #[error("Mail error: {0}")]
    Mail(#[from] authgate_mail::EmailError),

    /// The password hasher rejected its input (e.g. a malformed stored hash).
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Token signing failed.
    #[error("Token signing error: {0}")]
    Signing(#[from] SignerError),

    /// The collaborator could not be reached or did not answer in time.
    #[error("{0} unavailable")]
    Unavailable(String),
}

impl From<BackendError> for CoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Duplicate(constraint) => {
                tracing::warn!(%constraint, "Write rejected by unique constraint");
                CoreError::Conflict(format!("Duplicate value for {constraint}"))
            }
            other => {
                tracing::error!(error = %other, "Collaborator fault");
                CoreError::Internal(other.to_string())
            }
        }
    }
}

/// Translate a sqlx error, recognising PostgreSQL unique violations
/// (SQLSTATE `23505`) on constraints named `uq_*`.
pub fn classify_sqlx_error(err: sqlx::Error) -> BackendError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return BackendError::Duplicate(constraint.to_string());
            }
        }
    }
    BackendError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_becomes_conflict() {
        let core: CoreError = BackendError::Duplicate("uq_users_email".into()).into();
        assert!(matches!(core, CoreError::Conflict(msg) if msg.contains("uq_users_email")));
    }

    #[test]
    fn unavailable_becomes_internal() {
        let core: CoreError = BackendError::Unavailable("session cache".into()).into();
        assert!(matches!(core, CoreError::Internal(msg) if msg == "session cache unavailable"));
    }

    #[test]
    fn row_not_found_is_not_a_duplicate() {
        let err = classify_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, BackendError::Database(sqlx::Error::RowNotFound)));
    }
}
