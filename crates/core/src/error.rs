/// Domain-level failures returned by the auth services.
///
/// Each variant maps to exactly one outcome class at the HTTP edge; the
/// mapping lives in the API crate so this crate stays transport-agnostic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input, detected before any store access.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The addressed entity does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Username exists but the password did not verify.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A uniqueness rule or state precondition would be violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A token or session is past its expiry.
    #[error("Expired: {0}")]
    Expired(String),

    /// Missing or invalid bearer credentials on a protected request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An unexpected fault in a collaborator (store, cache, signer, mailer).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Human-readable message that is safe to return to a client.
    ///
    /// Internal faults are sanitised; their detail is only ever logged.
    pub fn public_message(&self) -> String {
        match self {
            CoreError::InvalidInput(msg)
            | CoreError::Conflict(msg)
            | CoreError::Expired(msg)
            | CoreError::Unauthorized(msg) => msg.clone(),
            CoreError::NotFound { entity } => format!("{entity} not found"),
            CoreError::InvalidCredentials => "Password is incorrect".to_string(),
            CoreError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_is_not_public() {
        let err = CoreError::Internal("connection refused (os error 111)".into());
        assert_eq!(err.public_message(), "An internal error occurred");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = CoreError::NotFound { entity: "User" };
        assert_eq!(err.public_message(), "User not found");
    }
}
