//! Keyed JSON blobs for goals and category spending snapshots.

mod model;
mod repository;

pub use model::AppStateDB;
pub use repository::AppStateRepository;

pub use spendquest_core::local_state::BlobStore;
