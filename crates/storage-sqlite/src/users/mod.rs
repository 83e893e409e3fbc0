//! SQLite storage implementation for users.

mod model;
mod repository;

pub use model::UserDB;
pub use repository::UserRepository;

// Re-export trait from core for convenience
pub use spendquest_core::users::UserRepositoryTrait;
