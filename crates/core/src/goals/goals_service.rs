use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::goals_model::{Goal, GoalStatus, GoalUpdate, NewGoal, Settlement, SettlementReport};
use super::goals_store::GoalStore;
use super::goals_traits::GoalServiceTrait;
use super::settlement::{evaluate, penalty_for, reward_for, spending_for, sync_current_spending};
use crate::errors::{Error, GoalError, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::local_state::BlobStore;
use crate::spending::{CategoryTotal, SpendingTracker};
use crate::users::UserRepositoryTrait;
use crate::utils::money::round_currency;
use crate::utils::time_utils::{local_offset, week_end_utc};

pub struct GoalService {
    store: GoalStore,
    spending: Arc<SpendingTracker>,
    users: Arc<dyn UserRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl GoalService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        spending: Arc<SpendingTracker>,
        users: Arc<dyn UserRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            store: GoalStore::new(blobs),
            spending,
            users,
            event_sink,
        }
    }

    fn checked_limit(limit: Decimal) -> Result<Decimal> {
        let limit = round_currency(limit);
        if limit <= Decimal::ZERO {
            return Err(GoalError::NonPositiveLimit.into());
        }
        Ok(limit)
    }

    /// Settles expired goals. The caller must hold the user's store lock.
    async fn settle_locked(
        &self,
        user_id: &str,
        goals: &mut [Goal],
        now: DateTime<Utc>,
    ) -> Result<Vec<SettlementReport>> {
        let mut pending = Vec::new();
        for goal in goals.iter_mut() {
            let (settled, settlement) = evaluate(goal, now);
            if settled.status != goal.status {
                *goal = settled.clone();
                pending.push((settled, settlement));
            }
        }
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        // Goals are written first; a failed coin update is never retried.
        self.store.save(user_id, goals).await?;

        let mut reports = Vec::with_capacity(pending.len());
        for (goal, settlement) in pending {
            let adjustment = match settlement.requested_delta() {
                0 => None,
                delta => match self.users.adjust_coins(user_id, delta).await {
                    Ok(adjustment) => Some(adjustment),
                    Err(e) => {
                        error!(
                            "Failed to apply {:?} for goal {} of user {}: {}",
                            settlement, goal.id, user_id, e
                        );
                        None
                    }
                },
            };
            info!(
                "Goal {} of user {} settled as {:?}",
                goal.id, user_id, goal.status
            );
            self.event_sink.emit(DomainEvent::goal_settled(
                user_id,
                goal.id.clone(),
                goal.status,
                adjustment.map(|a| a.delta).unwrap_or(0),
            ));
            reports.push(SettlementReport {
                goal,
                settlement,
                adjustment,
            });
        }
        Ok(reports)
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    async fn list_goals(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Goal>> {
        let _guard = self.store.lock(user_id).await?;
        let mut goals = self.store.load(user_id)?;
        self.settle_locked(user_id, &mut goals, now).await?;
        Ok(goals)
    }

    async fn create_goal(
        &self,
        user_id: &str,
        new_goal: NewGoal,
        now: DateTime<Utc>,
    ) -> Result<Goal> {
        let weekly_limit = Self::checked_limit(new_goal.weekly_limit)?;
        let name = new_goal.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        let offset = local_offset(new_goal.tz_offset_minutes.unwrap_or(0));
        let totals = self.spending.totals(user_id)?;

        let goal = Goal {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name,
            category: new_goal.category,
            weekly_limit,
            current_spending: spending_for(new_goal.category, &totals),
            start_date: now,
            end_date: week_end_utc(now, offset),
            status: GoalStatus::Active,
            reward: reward_for(weekly_limit),
            penalty: penalty_for(weekly_limit),
            settled_at: None,
        };

        let _guard = self.store.lock(user_id).await?;
        let mut goals = self.store.load(user_id)?;
        goals.push(goal.clone());
        self.store.save(user_id, &goals).await?;
        debug!("Created goal {} for user {}", goal.id, user_id);
        Ok(goal)
    }

    async fn update_goal(&self, user_id: &str, goal_id: &str, update: GoalUpdate) -> Result<Goal> {
        let _guard = self.store.lock(user_id).await?;
        let mut goals = self.store.load(user_id)?;
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))?;
        if goal.status.is_final() {
            return Err(GoalError::AlreadyFinalized(goal_id.to_string()).into());
        }

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
            goal.name = name;
        }
        if let Some(limit) = update.weekly_limit {
            let limit = Self::checked_limit(limit)?;
            goal.weekly_limit = limit;
            goal.reward = reward_for(limit);
            goal.penalty = penalty_for(limit);
        }
        let updated = goal.clone();
        self.store.save(user_id, &goals).await?;
        Ok(updated)
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<()> {
        let _guard = self.store.lock(user_id).await?;
        let mut goals = self.store.load(user_id)?;
        let before = goals.len();
        goals.retain(|g| g.id != goal_id);
        if goals.len() == before {
            return Err(Error::NotFound(format!("Goal {}", goal_id)));
        }
        self.store.save(user_id, &goals).await
    }

    async fn settle_goals(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SettlementReport>> {
        let _guard = self.store.lock(user_id).await?;
        let mut goals = self.store.load(user_id)?;
        self.settle_locked(user_id, &mut goals, now).await
    }

    async fn sync_spending(
        &self,
        user_id: &str,
        totals: &[CategoryTotal],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let _guard = self.store.lock(user_id).await?;
        let mut goals = self.store.load(user_id)?;
        // Expired goals settle on the figure from their own week.
        self.settle_locked(user_id, &mut goals, now).await?;
        let changed = sync_current_spending(&mut goals, totals, now);
        if changed > 0 {
            self.store.save(user_id, &goals).await?;
        }
        Ok(changed)
    }
}
