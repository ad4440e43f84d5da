//! Outbound email for account verification and password reset.
//!
//! - [`EmailDelivery`] -- async SMTP sender built on `lettre`.
//! - [`templates`] -- subject and HTML body for each message kind.

pub mod email;
pub mod templates;

pub use email::{EmailConfig, EmailDelivery, EmailError};
pub use templates::MailMessage;
