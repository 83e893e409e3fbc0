use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::spending_tracker::SpendingTracker;
use crate::goals::GoalServiceTrait;

/// Keeps active goals in step with the category totals.
///
/// The background task lives exactly as long as this value: dropping it
/// aborts the task.
pub struct GoalSyncSubscription {
    handle: JoinHandle<()>,
}

impl GoalSyncSubscription {
    /// Must be called from within a Tokio runtime.
    pub fn spawn(tracker: &SpendingTracker, goals: Arc<dyn GoalServiceTrait>) -> Self {
        let mut updates = tracker.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => match goals
                        .sync_spending(&update.user_id, &update.totals, Utc::now())
                        .await
                    {
                        Ok(changed) => {
                            debug!("Synced {} goal(s) for user {}", changed, update.user_id)
                        }
                        Err(e) => warn!("Goal sync failed for user {}: {}", update.user_id, e),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Goal sync skipped {} spending update(s)", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for GoalSyncSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
