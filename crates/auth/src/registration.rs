//! New account sign-up.

use std::sync::Arc;

use authgate_core::error::CoreError;
use authgate_core::types::DbId;
use authgate_db::models::user::{CreateUser, DEFAULT_ROLE};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::password::{validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::ports::{PasswordHasher, UserDirectory};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Sign-up request.
#[derive(Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
}

/// Public view of a newly created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
}

pub struct RegistrationService {
    users: Arc<dyn UserDirectory>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegistrationService {
    pub fn new(users: Arc<dyn UserDirectory>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Create an unverified account with the default role.
    ///
    /// Input is validated before the store is touched; a taken username or
    /// email is a `Conflict`.
    pub async fn register(&self, input: &Registration) -> Result<RegisteredUser, CoreError> {
        input
            .validate()
            .map_err(|e| CoreError::InvalidInput(e.to_string()))?;
        validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
            .map_err(CoreError::InvalidInput)?;

        let username = input.username.trim();
        let email = input.email.trim();

        if self.users.find_by_username(username).await?.is_some() {
            return Err(CoreError::Conflict("Username already exists".into()));
        }
        if self.users.find_by_email(email).await?.is_some() {
            return Err(CoreError::Conflict("Email already exists".into()));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        // A concurrent sign-up can still lose the race at the unique index,
        // which surfaces as Conflict through the BackendError conversion.
        let user = self
            .users
            .insert(&CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role: DEFAULT_ROLE.to_string(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(RegisteredUser {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}
