//! Weekly goal domain models.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::transactions::TransactionCategory;
use crate::users::{apply_coin_delta, CoinAdjustment};
use crate::validation::{FieldRule, Schema, Validate};

/// Goal lifecycle. Only `Active` goals can change; the other two are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Achieved,
    Failed,
}

impl GoalStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// A weekly spending cap with an automatic reward or penalty at week end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// When set, only this category counts toward the limit.
    #[serde(default)]
    pub category: Option<TransactionCategory>,
    pub weekly_limit: Decimal,
    pub current_spending: Decimal,
    pub start_date: DateTime<Utc>,
    /// Following Sunday 23:59:59 in the creator's local offset.
    pub end_date: DateTime<Utc>,
    pub status: GoalStatus,
    pub reward: i64,
    pub penalty: i64,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

/// Request body for creating a goal.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    #[serde(default)]
    pub category: Option<TransactionCategory>,
    pub weekly_limit: Decimal,
    /// Caller's UTC offset in minutes; defaults to UTC.
    #[serde(default)]
    pub tz_offset_minutes: Option<i32>,
}

static NEW_GOAL_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::string("name").required().length(1, 60),
        FieldRule::string("category").one_of(TransactionCategory::ALL),
        FieldRule::number("weeklyLimit").required().min(0.0),
        FieldRule::integer("tzOffsetMinutes").min(-840.0).max(840.0),
    ])
});

impl Validate for NewGoal {
    fn schema() -> &'static Schema {
        &NEW_GOAL_SCHEMA
    }
}

/// Mutable fields of an active goal.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub weekly_limit: Option<Decimal>,
}

static GOAL_UPDATE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::string("name").length(1, 60),
        FieldRule::number("weeklyLimit").min(0.0),
    ])
});

impl Validate for GoalUpdate {
    fn schema() -> &'static Schema {
        &GOAL_UPDATE_SCHEMA
    }
}

/// Coin instruction produced by evaluating a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "coins", rename_all = "lowercase")]
pub enum Settlement {
    None,
    Reward(i64),
    Penalty(i64),
}

impl Settlement {
    /// Signed change requested before clamping.
    pub fn requested_delta(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Reward(coins) => *coins,
            Self::Penalty(coins) => -*coins,
        }
    }

    /// Applies the instruction to a balance. A penalty debits at most the
    /// current balance.
    pub fn apply(&self, balance: i64) -> CoinAdjustment {
        apply_coin_delta(balance, self.requested_delta())
    }
}

/// Outcome of finalizing one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub goal: Goal,
    #[schema(value_type = Object)]
    pub settlement: Settlement,
    /// Coin change actually applied; `None` when the balance update failed.
    pub adjustment: Option<CoinAdjustment>,
}
