use async_trait::async_trait;
use rust_decimal::Decimal;

use super::debt_payoff::{Debt, PayoffResult, PayoffStrategy, StrategyComparison};
use super::scenarios::{QuizAnswer, QuizResult, ScenarioView};
use crate::errors::Result;

#[async_trait]
pub trait GameServiceTrait: Send + Sync {
    fn simulate_payoff(
        &self,
        debts: &[Debt],
        extra_monthly_payment: Decimal,
        strategy: PayoffStrategy,
    ) -> Result<PayoffResult>;

    fn compare_strategies(
        &self,
        debts: &[Debt],
        extra_monthly_payment: Decimal,
    ) -> Result<StrategyComparison>;

    fn list_scenarios(&self) -> Vec<ScenarioView>;

    /// Grades the answers and credits coins for scenarios the user has not
    /// solved before. Each scenario pays out once per user.
    async fn submit_quiz(&self, user_id: &str, answers: &[QuizAnswer]) -> Result<QuizResult>;
}
