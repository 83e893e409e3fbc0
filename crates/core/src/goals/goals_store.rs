use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::goals_model::Goal;
use crate::constants::GOALS_STORAGE_KEY;
use crate::errors::{Error, Result};
use crate::local_state::{read_json_list, state_key, write_json_list, BlobStore};

/// Goal list persistence over the keyed blob port.
///
/// Callers hold [`GoalStore::lock`] across load-modify-save so two settlements
/// of the same user cannot interleave within this process.
pub struct GoalStore {
    blobs: Arc<dyn BlobStore>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl GoalStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lock(&self, user_id: &str) -> Result<OwnedMutexGuard<()>> {
        let user_lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| Error::Unexpected("goal lock table poisoned".to_string()))?;
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        Ok(user_lock.lock_owned().await)
    }

    pub fn load(&self, user_id: &str) -> Result<Vec<Goal>> {
        read_json_list(self.blobs.as_ref(), &Self::key(user_id))
    }

    pub async fn save(&self, user_id: &str, goals: &[Goal]) -> Result<()> {
        write_json_list(self.blobs.as_ref(), &Self::key(user_id), goals).await
    }

    fn key(user_id: &str) -> String {
        state_key(user_id, GOALS_STORAGE_KEY)
    }
}
