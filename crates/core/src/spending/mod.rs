//! Category spend snapshot and its subscribers.
//!
//! [`SpendingTracker`] owns each user's category totals and broadcasts every
//! change. [`GoalSyncSubscription`] listens on that channel and refreshes the
//! user's active goals, replacing interval polling with push updates.

mod goal_sync;
mod spending_model;
mod spending_tracker;

pub use goal_sync::GoalSyncSubscription;
pub use spending_model::{CategoryTotal, ReplaceSpending, SpendingUpdate};
pub use spending_tracker::SpendingTracker;
