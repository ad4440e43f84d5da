//! Repository layer: one stateless struct per table.

pub mod session_repo;
pub mod user_repo;
pub mod verification_token_repo;

pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use verification_token_repo::VerificationTokenRepo;
