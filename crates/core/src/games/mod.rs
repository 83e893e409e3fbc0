//! Mini-games: debt payoff simulator and strategy scenarios.

mod debt_payoff;
mod games_service;
mod games_traits;
mod scenarios;

pub use debt_payoff::{
    compare, simulate, CompareStrategiesRequest, Debt, DebtPayoffRequest, PayoffResult,
    PayoffStrategy, StrategyComparison,
};
pub use games_service::GameService;
pub use games_traits::GameServiceTrait;
pub use scenarios::{
    grade, scenarios, QuizAnswer, QuizResult, Scenario, ScenarioFeedback, ScenarioView,
    SubmitQuiz,
};
