//! Weekly goals - creation, spending sync and one-time settlement.

mod goals_model;
mod goals_service;
mod goals_store;
mod goals_traits;
mod settlement;

pub use goals_model::{Goal, GoalStatus, GoalUpdate, NewGoal, Settlement, SettlementReport};
pub use goals_service::GoalService;
pub use goals_store::GoalStore;
pub use goals_traits::GoalServiceTrait;
pub use settlement::{evaluate, penalty_for, reward_for, spending_for, sync_current_spending};
