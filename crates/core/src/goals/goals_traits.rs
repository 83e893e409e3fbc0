use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::goals_model::{Goal, GoalUpdate, NewGoal, SettlementReport};
use crate::errors::Result;
use crate::spending::CategoryTotal;

#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    /// Returns the user's goals after settling any whose week has ended.
    async fn list_goals(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Goal>>;

    /// Creates an active goal ending on the coming Sunday. Current spending
    /// is snapshotted from the category totals.
    async fn create_goal(&self, user_id: &str, new_goal: NewGoal, now: DateTime<Utc>)
        -> Result<Goal>;

    async fn update_goal(&self, user_id: &str, goal_id: &str, update: GoalUpdate) -> Result<Goal>;

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<()>;

    /// Finalizes every expired active goal and applies the coin changes.
    async fn settle_goals(&self, user_id: &str, now: DateTime<Utc>)
        -> Result<Vec<SettlementReport>>;

    /// Settles goals that expired before `now`, then refreshes current
    /// spending on the goals still running. Returns how many were refreshed.
    async fn sync_spending(
        &self,
        user_id: &str,
        totals: &[CategoryTotal],
        now: DateTime<Utc>,
    ) -> Result<usize>;
}
