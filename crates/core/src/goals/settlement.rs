//! Pure weekly goal rules.

use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use super::goals_model::{Goal, GoalStatus, Settlement};
use crate::constants::{GOAL_PENALTY_DIVISOR, GOAL_REWARD_DIVISOR};
use crate::spending::CategoryTotal;
use crate::transactions::TransactionCategory;

/// Coins credited when a goal is achieved: `floor(limit / 100)`.
pub fn reward_for(weekly_limit: Decimal) -> i64 {
    floor_div(weekly_limit, GOAL_REWARD_DIVISOR)
}

/// Coins debited when a goal fails: `floor(limit / 200)`.
pub fn penalty_for(weekly_limit: Decimal) -> i64 {
    floor_div(weekly_limit, GOAL_PENALTY_DIVISOR)
}

fn floor_div(amount: Decimal, divisor: i64) -> i64 {
    (amount / Decimal::from(divisor))
        .floor()
        .to_i64()
        .unwrap_or(0)
        .max(0)
}

/// Evaluates a goal at `now`.
///
/// Active goals whose week has ended are finalized: achieved when spending
/// stayed within the limit, failed otherwise. Anything else is returned
/// unchanged with [`Settlement::None`], so evaluating twice is a no-op.
pub fn evaluate(goal: &Goal, now: DateTime<Utc>) -> (Goal, Settlement) {
    if goal.status.is_final() || now <= goal.end_date {
        return (goal.clone(), Settlement::None);
    }

    let mut settled = goal.clone();
    settled.settled_at = Some(now);
    let settlement = if goal.current_spending <= goal.weekly_limit {
        settled.status = GoalStatus::Achieved;
        Settlement::Reward(goal.reward)
    } else {
        settled.status = GoalStatus::Failed;
        Settlement::Penalty(goal.penalty)
    };
    (settled, settlement)
}

/// Spending attributed to a goal: one category, or every category when unset.
pub fn spending_for(category: Option<TransactionCategory>, totals: &[CategoryTotal]) -> Decimal {
    totals
        .iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .map(|t| t.amount)
        .sum()
}

/// Refreshes `current_spending` on goals whose week is still running at `now`.
/// Finalized and expired goals keep the figure they were last synced with.
/// Returns how many goals changed.
pub fn sync_current_spending(
    goals: &mut [Goal],
    totals: &[CategoryTotal],
    now: DateTime<Utc>,
) -> usize {
    let mut changed = 0;
    for goal in goals
        .iter_mut()
        .filter(|g| g.status == GoalStatus::Active && now <= g.end_date)
    {
        let spending = spending_for(goal.category, totals);
        if goal.current_spending != spending {
            goal.current_spending = spending;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn goal(limit: Decimal, spending: Decimal) -> Goal {
        let start = Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap();
        Goal {
            id: "g1".into(),
            user_id: "u1".into(),
            name: "Eat out less".into(),
            category: None,
            weekly_limit: limit,
            current_spending: spending,
            start_date: start,
            end_date: Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap(),
            status: GoalStatus::Active,
            reward: reward_for(limit),
            penalty: penalty_for(limit),
            settled_at: None,
        }
    }

    #[test]
    fn test_reward_and_penalty_floor() {
        assert_eq!(reward_for(dec!(2000)), 20);
        assert_eq!(penalty_for(dec!(2000)), 10);
        assert_eq!(reward_for(dec!(199.99)), 1);
        assert_eq!(penalty_for(dec!(199.99)), 0);
    }

    #[test]
    fn test_not_expired_is_unchanged() {
        let g = goal(dec!(2000), dec!(2500));
        let (out, settlement) = evaluate(&g, g.end_date);
        assert_eq!(out, g);
        assert_eq!(settlement, Settlement::None);
    }

    #[test]
    fn test_overspent_goal_fails_with_penalty() {
        let g = goal(dec!(2000), dec!(2500));
        let now = g.end_date + Duration::seconds(1);
        let (out, settlement) = evaluate(&g, now);
        assert_eq!(out.status, GoalStatus::Failed);
        assert_eq!(out.settled_at, Some(now));
        assert_eq!(settlement, Settlement::Penalty(10));

        assert_eq!(settlement.apply(25).balance_after, 15);
        assert_eq!(settlement.apply(4).balance_after, 0);
    }

    #[test]
    fn test_spending_equal_to_limit_is_achieved() {
        let g = goal(dec!(2000), dec!(2000));
        let (out, settlement) = evaluate(&g, g.end_date + Duration::days(1));
        assert_eq!(out.status, GoalStatus::Achieved);
        assert_eq!(settlement, Settlement::Reward(20));
    }

    #[test]
    fn test_finalized_goal_is_idempotent() {
        let g = goal(dec!(2000), dec!(100));
        let now = g.end_date + Duration::days(1);
        let (settled, _) = evaluate(&g, now);
        let (again, settlement) = evaluate(&settled, now + Duration::days(7));
        assert_eq!(again, settled);
        assert_eq!(settlement, Settlement::None);
    }

    #[test]
    fn test_sync_only_touches_active_goals() {
        let totals = vec![
            CategoryTotal::new(TransactionCategory::Food, dec!(300)),
            CategoryTotal::new(TransactionCategory::Bills, dec!(200)),
        ];
        let mut active = goal(dec!(1000), dec!(0));
        active.category = Some(TransactionCategory::Food);
        let mut all = goal(dec!(1000), dec!(0));
        all.id = "g2".into();
        let mut done = goal(dec!(1000), dec!(50));
        done.id = "g3".into();
        done.status = GoalStatus::Achieved;

        let mut goals = vec![active, all, done];
        let now = goals[0].start_date;
        assert_eq!(sync_current_spending(&mut goals, &totals, now), 2);
        assert_eq!(goals[0].current_spending, dec!(300));
        assert_eq!(goals[1].current_spending, dec!(500));
        assert_eq!(goals[2].current_spending, dec!(50));
        assert_eq!(sync_current_spending(&mut goals, &totals, now), 0);
    }

    #[test]
    fn test_sync_skips_goals_past_their_week() {
        let mut goals = vec![goal(dec!(1000), dec!(400))];
        let next_week = goals[0].end_date + Duration::days(2);
        let totals = vec![CategoryTotal::new(TransactionCategory::Food, dec!(1500))];
        assert_eq!(sync_current_spending(&mut goals, &totals, next_week), 0);
        assert_eq!(goals[0].current_spending, dec!(400));
    }
}
