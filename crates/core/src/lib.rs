//! SpendQuest Core - Domain entities, services, and traits.
//!
//! This crate contains the business rules for SpendQuest: weekly goal
//! settlement, payment verification, mini-games and request validation.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `gateway` crates.

pub mod constants;
pub mod errors;
pub mod events;
pub mod games;
pub mod goals;
pub mod local_state;
pub mod payments;
pub mod spending;
pub mod transactions;
pub mod users;
pub mod utils;
pub mod validation;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
