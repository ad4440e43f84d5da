//! Signed, time-bounded tokens for the four token purposes.
//!
//! Every purpose (access, refresh, email verification, password reset) has
//! its own HS256 secret and default lifetime, so a token minted for one
//! purpose never validates for another. Validation checks signature, issuer
//! and expiry only; it never consults a store.

use authgate_core::types::Timestamp;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    Access,
    Refresh,
    EmailVerify,
    ResetPassword,
}

impl TokenPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
            TokenPurpose::EmailVerify => "email_verify",
            TokenPurpose::ResetPassword => "reset_password",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while configuring or using the signer.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// No usable secret was configured for this purpose.
    #[error("No signing secret configured for {0} tokens")]
    MissingSecret(TokenPurpose),

    /// The JWT library refused to encode the claims.
    #[error("Token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- a user id for access/refresh, an email address otherwise.
    pub sub: String,
    /// Issuer, checked on validation.
    pub iss: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier so two tokens minted in the same second differ.
    pub jti: String,
}

/// A freshly minted token and the instant it stops validating.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Secrets and lifetimes for every token purpose.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub verify_email_secret: String,
    pub reset_password_secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 1).
    pub refresh_token_expiry_days: i64,
    /// Email-verify and reset-password lifetime in minutes (default: 15).
    pub verification_token_expiry_mins: i64,
    /// `iss` claim written and required on every token.
    pub issuer: String,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 1;
/// Default verification token expiry in minutes.
const DEFAULT_VERIFICATION_EXPIRY_MINS: i64 = 15;
/// Default issuer claim.
const DEFAULT_ISSUER: &str = "authgate";

impl TokenConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                          | Required | Default    |
    /// |----------------------------------|----------|------------|
    /// | `ACCESS_TOKEN_SECRET`            | **yes**  | --         |
    /// | `REFRESH_TOKEN_SECRET`           | **yes**  | --         |
    /// | `VERIFY_EMAIL_SECRET`            | **yes**  | --         |
    /// | `RESET_PASSWORD_SECRET`          | **yes**  | --         |
    /// | `ACCESS_TOKEN_EXPIRY_MINS`       | no       | `15`       |
    /// | `REFRESH_TOKEN_EXPIRY_DAYS`      | no       | `1`        |
    /// | `VERIFICATION_TOKEN_EXPIRY_MINS` | no       | `15`       |
    /// | `JWT_ISSUER`                     | no       | `authgate` |
    ///
    /// Secrets are not checked here; [`TokenSigner::new`] rejects empty ones.
    ///
    /// # Panics
    ///
    /// Panics if a secret variable is unset or an expiry is not a valid i64.
    pub fn from_env() -> Self {
        let secret = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"))
        };
        let number = |name: &str, default: i64| -> i64 {
            std::env::var(name)
                .unwrap_or_else(|_| default.to_string())
                .parse()
                .unwrap_or_else(|_| panic!("{name} must be a valid i64"))
        };

        Self {
            access_secret: secret("ACCESS_TOKEN_SECRET"),
            refresh_secret: secret("REFRESH_TOKEN_SECRET"),
            verify_email_secret: secret("VERIFY_EMAIL_SECRET"),
            reset_password_secret: secret("RESET_PASSWORD_SECRET"),
            access_token_expiry_mins: number("ACCESS_TOKEN_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            refresh_token_expiry_days: number(
                "REFRESH_TOKEN_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            ),
            verification_token_expiry_mins: number(
                "VERIFICATION_TOKEN_EXPIRY_MINS",
                DEFAULT_VERIFICATION_EXPIRY_MINS,
            ),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string()),
        }
    }

    fn secret(&self, purpose: TokenPurpose) -> &str {
        match purpose {
            TokenPurpose::Access => &self.access_secret,
            TokenPurpose::Refresh => &self.refresh_secret,
            TokenPurpose::EmailVerify => &self.verify_email_secret,
            TokenPurpose::ResetPassword => &self.reset_password_secret,
        }
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str, purpose: TokenPurpose) -> Result<Self, SignerError> {
        if secret.trim().is_empty() {
            return Err(SignerError::MissingSecret(purpose));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

/// Issues and validates tokens. Cheap to share behind an `Arc`.
pub struct TokenSigner {
    access: KeyPair,
    refresh: KeyPair,
    email_verify: KeyPair,
    reset_password: KeyPair,
    config: TokenConfig,
}

impl TokenSigner {
    /// Build a signer, failing fast if any purpose lacks a secret.
    pub fn new(config: TokenConfig) -> Result<Self, SignerError> {
        Ok(Self {
            access: KeyPair::from_secret(config.secret(TokenPurpose::Access), TokenPurpose::Access)?,
            refresh: KeyPair::from_secret(
                config.secret(TokenPurpose::Refresh),
                TokenPurpose::Refresh,
            )?,
            email_verify: KeyPair::from_secret(
                config.secret(TokenPurpose::EmailVerify),
                TokenPurpose::EmailVerify,
            )?,
            reset_password: KeyPair::from_secret(
                config.secret(TokenPurpose::ResetPassword),
                TokenPurpose::ResetPassword,
            )?,
            config,
        })
    }

    fn keys(&self, purpose: TokenPurpose) -> &KeyPair {
        match purpose {
            TokenPurpose::Access => &self.access,
            TokenPurpose::Refresh => &self.refresh,
            TokenPurpose::EmailVerify => &self.email_verify,
            TokenPurpose::ResetPassword => &self.reset_password,
        }
    }

    /// Default lifetime for tokens of this purpose.
    pub fn default_ttl(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::Access => Duration::minutes(self.config.access_token_expiry_mins),
            TokenPurpose::Refresh => Duration::days(self.config.refresh_token_expiry_days),
            TokenPurpose::EmailVerify | TokenPurpose::ResetPassword => {
                Duration::minutes(self.config.verification_token_expiry_mins)
            }
        }
    }

    /// Mint a token for `subject` that expires `ttl` from now.
    pub fn issue(
        &self,
        purpose: TokenPurpose,
        subject: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, SignerError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            iss: self.config.issuer.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(purpose).encoding,
        )?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Mint a token with the purpose's default lifetime.
    pub fn issue_default(
        &self,
        purpose: TokenPurpose,
        subject: &str,
    ) -> Result<IssuedToken, SignerError> {
        self.issue(purpose, subject, self.default_ttl(purpose))
    }

    /// Return the token's subject if it was signed for `purpose` by this
    /// signer and has not expired. Any failure yields `None`.
    pub fn validate(&self, purpose: TokenPurpose, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        match decode::<Claims>(token, &self.keys(purpose).decoding, &validation) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                tracing::debug!(%purpose, error = %e, "Token rejected");
                None
            }
        }
    }
}
