//! Authgate HTTP service library.
//!
//! Exposes configuration, state wiring, error mapping and the router so the
//! binary and the integration tests build the exact same application.

pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
