use std::time::Duration;

/// The only settlement currency accepted by the payment gateway.
pub const SUPPORTED_CURRENCY: &str = "INR";

/// Minor units per major currency unit (paise per rupee).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Decimal precision for currency amounts
pub const CURRENCY_DECIMAL_PRECISION: u32 = 2;

/// Local-state key suffix for the weekly goal list
pub const GOALS_STORAGE_KEY: &str = "weeklyGoals";

/// Local-state key suffix for the category spend snapshot
pub const CATEGORY_SPENDING_STORAGE_KEY: &str = "categorySpending";

/// Local-state key suffix for the scenarios a user has already been paid for
pub const SOLVED_SCENARIOS_STORAGE_KEY: &str = "solvedScenarios";

/// Divisor applied to a weekly limit to derive the achievement reward.
pub const GOAL_REWARD_DIVISOR: i64 = 100;

/// Divisor applied to a weekly limit to derive the failure penalty.
pub const GOAL_PENALTY_DIVISOR: i64 = 200;

/// Upper bound on simulated months for the debt payoff game.
pub const DEBT_SIMULATION_MONTH_CAP: u32 = 120;

/// Default hard deadline for gateway order creation.
pub const DEFAULT_ORDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Default and maximum page sizes for transaction listing.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Coins awarded per correctly answered strategy scenario.
pub const SCENARIO_COINS_PER_CORRECT: i64 = 5;
