//! Row models and creation DTOs, one module per table.

pub mod session;
pub mod user;
pub mod verification_token;
