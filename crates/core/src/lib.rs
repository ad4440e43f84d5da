//! Shared primitives for the authgate workspace.
//!
//! - [`types`] -- identifier and timestamp aliases used by every crate.
//! - [`error`] -- the domain error taxonomy surfaced by the auth services.

pub mod error;
pub mod types;
