//! SQLite storage implementation for SpendQuest.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `spendquest-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for users, transactions and local state blobs
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!     core (domain)      server (HTTP)
//!          │                  │
//!          └────────┬─────────┘
//!                   │
//!                   ▼
//!         storage-sqlite (this crate)
//!                   │
//!                   ▼
//!               SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod app_state;
pub mod transactions;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use app_state::AppStateRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

// Re-export from spendquest-core for convenience
pub use spendquest_core::errors::{DatabaseError, Error, Result};
