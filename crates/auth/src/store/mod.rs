//! Durable store adapters.

pub mod postgres;

pub use self::postgres::PgStore;
