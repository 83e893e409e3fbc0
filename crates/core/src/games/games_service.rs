use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::debt_payoff::{compare, simulate, Debt, PayoffResult, PayoffStrategy, StrategyComparison};
use super::games_traits::GameServiceTrait;
use super::scenarios::{grade, scenarios, QuizAnswer, QuizResult, ScenarioView};
use crate::constants::{SCENARIO_COINS_PER_CORRECT, SOLVED_SCENARIOS_STORAGE_KEY};
use crate::errors::{Result, ValidationError};
use crate::local_state::{read_json_list, state_key, write_json_list, BlobStore};
use crate::users::UserServiceTrait;

pub struct GameService {
    users: Arc<dyn UserServiceTrait>,
    blobs: Arc<dyn BlobStore>,
    // Serializes read-modify-write of the solved lists.
    solved_lock: Mutex<()>,
}

impl GameService {
    pub fn new(users: Arc<dyn UserServiceTrait>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            users,
            blobs,
            solved_lock: Mutex::new(()),
        }
    }

    fn check_inputs(debts: &[Debt], extra_monthly_payment: Decimal) -> Result<()> {
        if extra_monthly_payment.is_sign_negative() {
            return Err(
                ValidationError::invalid("Extra monthly payment must not be negative").into(),
            );
        }
        debts.iter().try_for_each(Debt::validate)
    }
}

#[async_trait]
impl GameServiceTrait for GameService {
    fn simulate_payoff(
        &self,
        debts: &[Debt],
        extra_monthly_payment: Decimal,
        strategy: PayoffStrategy,
    ) -> Result<PayoffResult> {
        Self::check_inputs(debts, extra_monthly_payment)?;
        Ok(simulate(debts, extra_monthly_payment, strategy))
    }

    fn compare_strategies(
        &self,
        debts: &[Debt],
        extra_monthly_payment: Decimal,
    ) -> Result<StrategyComparison> {
        Self::check_inputs(debts, extra_monthly_payment)?;
        Ok(compare(debts, extra_monthly_payment))
    }

    fn list_scenarios(&self) -> Vec<ScenarioView> {
        scenarios().iter().map(ScenarioView::from).collect()
    }

    async fn submit_quiz(&self, user_id: &str, answers: &[QuizAnswer]) -> Result<QuizResult> {
        let mut result = grade(answers)?;

        let _guard = self.solved_lock.lock().await;
        let key = state_key(user_id, SOLVED_SCENARIOS_STORAGE_KEY);
        let mut solved: Vec<String> = read_json_list(self.blobs.as_ref(), &key)?;
        let before = solved.len();
        for feedback in result.feedback.iter().filter(|f| f.correct) {
            if !solved.contains(&feedback.scenario_id) {
                solved.push(feedback.scenario_id.clone());
            }
        }
        let newly_solved = solved.len() - before;
        if newly_solved > 0 {
            // Marked before crediting; a failed credit is not retried.
            write_json_list(self.blobs.as_ref(), &key, &solved).await?;
        }
        result.coins_earned = newly_solved as i64 * SCENARIO_COINS_PER_CORRECT;

        let adjustment = self.users.adjust_coins(user_id, result.coins_earned).await?;
        debug!(
            "User {} scored {}/{} on scenarios",
            user_id, result.correct, result.total
        );
        result.balance = Some(adjustment.balance_after);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpDomainEventSink;
    use crate::local_state::InMemoryBlobStore;
    use crate::users::testing::InMemoryUserRepository;
    use crate::users::UserService;
    use rust_decimal_macros::dec;

    fn service() -> GameService {
        let users = UserService::new(
            Arc::new(InMemoryUserRepository::with_user("u1", 7)),
            Arc::new(NoOpDomainEventSink),
        );
        GameService::new(Arc::new(users), Arc::new(InMemoryBlobStore::new()))
    }

    fn answer(scenario_id: &str, choice: usize) -> QuizAnswer {
        QuizAnswer {
            scenario_id: scenario_id.into(),
            choice,
        }
    }

    #[tokio::test]
    async fn test_submit_quiz_credits_coins() {
        let svc = service();
        let result = svc
            .submit_quiz(
                "u1",
                &[answer("card-minimum", 1), answer("emergency-fund", 1)],
            )
            .await
            .unwrap();
        assert_eq!(result.coins_earned, 10);
        assert_eq!(result.balance, Some(17));
    }

    #[tokio::test]
    async fn test_each_scenario_pays_out_once() {
        let svc = service();
        let first = svc
            .submit_quiz("u1", &[answer("card-minimum", 1)])
            .await
            .unwrap();
        assert_eq!(first.coins_earned, 5);
        assert_eq!(first.balance, Some(12));

        let again = svc
            .submit_quiz(
                "u1",
                &[answer("card-minimum", 1), answer("emergency-fund", 1)],
            )
            .await
            .unwrap();
        assert_eq!(again.correct, 2);
        assert_eq!(again.coins_earned, 5);
        assert_eq!(again.balance, Some(17));

        let repeat = svc
            .submit_quiz("u1", &[answer("emergency-fund", 1)])
            .await
            .unwrap();
        assert_eq!(repeat.correct, 1);
        assert_eq!(repeat.coins_earned, 0);
        assert_eq!(repeat.balance, Some(17));
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let svc = service();
        let debts = vec![Debt {
            name: "card".into(),
            amount: dec!(-5),
            annual_rate: dec!(10),
            minimum_payment: dec!(1),
        }];
        assert!(svc
            .simulate_payoff(&debts, dec!(0), PayoffStrategy::Snowball)
            .is_err());
        assert!(svc.compare_strategies(&[], dec!(-1)).is_err());
    }

    #[test]
    fn test_list_scenarios_matches_catalog() {
        assert_eq!(service().list_scenarios().len(), scenarios().len());
    }
}
