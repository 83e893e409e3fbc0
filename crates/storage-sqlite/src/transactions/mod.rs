//! SQLite storage implementation for transactions.

mod model;
mod repository;

pub use model::TransactionDB;
pub use repository::TransactionRepository;

// Re-export trait from core for convenience
pub use spendquest_core::transactions::TransactionRepositoryTrait;
