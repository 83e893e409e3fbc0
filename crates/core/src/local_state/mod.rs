//! Per-user local state persisted as keyed JSON blobs.
//!
//! Goals and category snapshots are stored as JSON arrays under a fixed key
//! per user. Storage is abstracted behind [`BlobStore`] so the goal rules can
//! be exercised against [`InMemoryBlobStore`] in tests.

mod blob_store;

pub use blob_store::{read_json_list, state_key, write_json_list, BlobStore, InMemoryBlobStore};
