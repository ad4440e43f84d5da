//! Authentication core: credential checks, token signing, and the session
//! lifecycle that keeps the durable session store and the session cache in
//! step.
//!
//! - [`ports`] -- collaborator traits the managers are constructed with.
//! - [`signer`] -- per-purpose HS256 token issuance and validation.
//! - [`password`] -- Argon2id hashing behind the [`ports::PasswordHasher`] seam.
//! - [`cache`] -- the cached session view plus Redis and in-process caches.
//! - [`lifecycle`] -- [`SessionLifecycleManager`], the login state machine.
//! - [`verification`] -- email-verification and password-reset tokens.
//! - [`registration`] -- new account sign-up.
//! - [`store`] / [`mailer`] -- production adapters for the ports.
//! - [`memory`] -- in-process collaborators for tests and local runs.

pub mod backend;
pub mod cache;
pub mod lifecycle;
pub mod mailer;
pub mod memory;
pub mod password;
pub mod ports;
pub mod registration;
pub mod signer;
pub mod store;
pub mod verification;

pub use backend::BackendError;
pub use lifecycle::{SessionHandle, SessionLifecycleManager};
pub use registration::{RegisteredUser, Registration, RegistrationService};
pub use signer::{TokenConfig, TokenPurpose, TokenSigner};
pub use verification::{PasswordReset, VerificationTokenManager};
