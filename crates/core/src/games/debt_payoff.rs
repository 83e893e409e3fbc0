//! Debt payoff simulation for the snowball/avalanche mini-game.

use std::fmt;

use log::warn;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::DEBT_SIMULATION_MONTH_CAP;
use crate::errors::{Result, ValidationError};
use crate::utils::money::round_currency;
use crate::validation::{FieldRule, Schema, Validate};

const MONTHS_PER_YEAR: i64 = 12;
const MAX_DEBTS: usize = 20;
/// Upper bound on a debt's annual rate, in percent.
const MAX_ANNUAL_RATE: i64 = 100;
/// Upper bound on any single amount fed to the simulator.
const MAX_AMOUNT: i64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub name: String,
    pub amount: Decimal,
    /// Annual interest rate in percent.
    pub annual_rate: Decimal,
    pub minimum_payment: Decimal,
}

impl Debt {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("debts.name".to_string()).into());
        }
        if self.amount.is_sign_negative()
            || self.annual_rate.is_sign_negative()
            || self.minimum_payment.is_sign_negative()
        {
            return Err(ValidationError::invalid(format!(
                "Debt '{}' must not have negative values",
                self.name
            ))
            .into());
        }
        if self.annual_rate > Decimal::from(MAX_ANNUAL_RATE) {
            return Err(ValidationError::invalid(format!(
                "Debt '{}' annual rate must be at most {}%",
                self.name, MAX_ANNUAL_RATE
            ))
            .into());
        }
        let max_amount = Decimal::from(MAX_AMOUNT);
        if self.amount > max_amount || self.minimum_payment > max_amount {
            return Err(ValidationError::invalid(format!(
                "Debt '{}' amounts must be at most {}",
                self.name, MAX_AMOUNT
            ))
            .into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PayoffStrategy {
    /// Smallest outstanding balance first.
    Snowball,
    /// Highest interest rate first.
    Avalanche,
}

impl PayoffStrategy {
    pub const ALL: &'static [&'static str] = &["snowball", "avalanche"];
}

impl fmt::Display for PayoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snowball => f.write_str("snowball"),
            Self::Avalanche => f.write_str("avalanche"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoffResult {
    pub months: u32,
    pub total_interest: Decimal,
    /// Debt names in the order they were cleared.
    pub payoff_order: Vec<String>,
    /// True when the month cap was hit with debt still outstanding.
    pub capped: bool,
}

/// Request body for one simulation run.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoffRequest {
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub extra_monthly_payment: Decimal,
    pub strategy: PayoffStrategy,
}

static DEBT_PAYOFF_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::array("debts").required().length(1, MAX_DEBTS),
        FieldRule::number("extraMonthlyPayment")
            .min(0.0)
            .max(MAX_AMOUNT as f64),
        FieldRule::string("strategy")
            .required()
            .one_of(PayoffStrategy::ALL),
    ])
});

impl Validate for DebtPayoffRequest {
    fn schema() -> &'static Schema {
        &DEBT_PAYOFF_SCHEMA
    }
}

/// Request body for running both strategies side by side.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompareStrategiesRequest {
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub extra_monthly_payment: Decimal,
}

static COMPARE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::array("debts").required().length(1, MAX_DEBTS),
        FieldRule::number("extraMonthlyPayment")
            .min(0.0)
            .max(MAX_AMOUNT as f64),
    ])
});

impl Validate for CompareStrategiesRequest {
    fn schema() -> &'static Schema {
        &COMPARE_SCHEMA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub snowball: PayoffResult,
    pub avalanche: PayoffResult,
    /// Snowball interest minus avalanche interest.
    pub interest_saved_by_avalanche: Decimal,
}

struct Balance<'a> {
    debt: &'a Debt,
    remaining: Decimal,
}

/// Picks the debt that receives the extra payment. Ties keep input order.
fn priority_index(balances: &[Balance<'_>], strategy: PayoffStrategy) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, b) in balances.iter().enumerate() {
        let better = match best {
            None => true,
            Some(j) => match strategy {
                PayoffStrategy::Snowball => b.remaining < balances[j].remaining,
                PayoffStrategy::Avalanche => b.debt.annual_rate > balances[j].debt.annual_rate,
            },
        };
        if better {
            best = Some(i);
        }
    }
    best
}

/// Runs the month-by-month payoff.
///
/// Each month every debt accrues `rate / 12` interest and receives its
/// minimum payment; the whole extra payment then goes to the priority debt.
/// Debts at or below zero are cleared. Stops when nothing is owed or after
/// the month cap. A balance that outgrows `Decimal` also ends the run as
/// capped.
pub fn simulate(debts: &[Debt], extra_monthly_payment: Decimal, strategy: PayoffStrategy) -> PayoffResult {
    let monthly_divisor = Decimal::from(100 * MONTHS_PER_YEAR);
    let extra = extra_monthly_payment.max(Decimal::ZERO);

    let mut payoff_order = Vec::new();
    let mut balances: Vec<Balance<'_>> = Vec::with_capacity(debts.len());
    for debt in debts {
        if debt.amount > Decimal::ZERO {
            balances.push(Balance {
                debt,
                remaining: debt.amount,
            });
        } else {
            payoff_order.push(debt.name.clone());
        }
    }

    let mut months = 0;
    let mut total_interest = Decimal::ZERO;
    'months: while !balances.is_empty() && months < DEBT_SIMULATION_MONTH_CAP {
        months += 1;

        for b in balances.iter_mut() {
            let accrued = b
                .remaining
                .checked_mul(b.debt.annual_rate)
                .and_then(|v| v.checked_div(monthly_divisor))
                .and_then(|interest| {
                    let remaining = b.remaining.checked_add(interest)?;
                    let total = total_interest.checked_add(interest)?;
                    Some((remaining, total))
                });
            match accrued {
                Some((remaining, total)) => {
                    b.remaining = remaining;
                    total_interest = total;
                }
                None => {
                    warn!("Debt '{}' overflowed after {} months", b.debt.name, months);
                    break 'months;
                }
            }
        }
        for b in balances.iter_mut() {
            b.remaining -= b.debt.minimum_payment.min(b.remaining);
        }
        if extra > Decimal::ZERO {
            if let Some(i) = priority_index(&balances, strategy) {
                balances[i].remaining -= extra;
            }
        }

        balances.retain(|b| {
            let cleared = b.remaining <= Decimal::ZERO;
            if cleared {
                payoff_order.push(b.debt.name.clone());
            }
            !cleared
        });
    }

    PayoffResult {
        months,
        total_interest: round_currency(total_interest),
        payoff_order,
        capped: !balances.is_empty(),
    }
}

pub fn compare(debts: &[Debt], extra_monthly_payment: Decimal) -> StrategyComparison {
    let snowball = simulate(debts, extra_monthly_payment, PayoffStrategy::Snowball);
    let avalanche = simulate(debts, extra_monthly_payment, PayoffStrategy::Avalanche);
    StrategyComparison {
        interest_saved_by_avalanche: snowball.total_interest - avalanche.total_interest,
        snowball,
        avalanche,
    }
}
