//! Domain event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::goals::GoalStatus;
use crate::transactions::TransactionCategory;

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about domain data changes. Runtime adapters
/// translate them into platform-specific actions (logging, notifications).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A weekly goal was finalized.
    GoalSettled {
        user_id: String,
        goal_id: String,
        status: GoalStatus,
        /// Signed coin change actually applied (penalties are clamped).
        coins_delta: i64,
    },

    /// A gateway payment passed signature verification.
    PaymentCompleted {
        user_id: String,
        transaction_id: String,
        amount: Decimal,
        category: TransactionCategory,
    },

    /// A gateway callback was rejected.
    PaymentFailed {
        user_id: String,
        transaction_id: String,
        reason: String,
    },

    /// A user's coin balance changed.
    CoinsAdjusted {
        user_id: String,
        delta: i64,
        balance: i64,
    },
}

impl DomainEvent {
    /// Creates a GoalSettled event.
    pub fn goal_settled(
        user_id: impl Into<String>,
        goal_id: impl Into<String>,
        status: GoalStatus,
        coins_delta: i64,
    ) -> Self {
        Self::GoalSettled {
            user_id: user_id.into(),
            goal_id: goal_id.into(),
            status,
            coins_delta,
        }
    }

    /// Creates a PaymentCompleted event.
    pub fn payment_completed(
        user_id: impl Into<String>,
        transaction_id: impl Into<String>,
        amount: Decimal,
        category: TransactionCategory,
    ) -> Self {
        Self::PaymentCompleted {
            user_id: user_id.into(),
            transaction_id: transaction_id.into(),
            amount,
            category,
        }
    }

    /// Creates a PaymentFailed event.
    pub fn payment_failed(
        user_id: impl Into<String>,
        transaction_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PaymentFailed {
            user_id: user_id.into(),
            transaction_id: transaction_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a CoinsAdjusted event.
    pub fn coins_adjusted(user_id: impl Into<String>, delta: i64, balance: i64) -> Self {
        Self::CoinsAdjusted {
            user_id: user_id.into(),
            delta,
            balance,
        }
    }

    /// Name used for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GoalSettled { .. } => "goal_settled",
            Self::PaymentCompleted { .. } => "payment_completed",
            Self::PaymentFailed { .. } => "payment_failed",
            Self::CoinsAdjusted { .. } => "coins_adjusted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_goal_settled_serializes_with_type_tag() {
        let event = DomainEvent::goal_settled("u1", "g1", GoalStatus::Failed, -10);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "goal_settled");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["coins_delta"], -10);
    }

    #[test]
    fn test_kind_matches_tag() {
        let event =
            DomainEvent::payment_completed("u1", "t1", dec!(10), TransactionCategory::Food);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
    }
}
