use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::transactions::TransactionCategory;
use crate::validation::{FieldRule, Schema, Validate};

/// Running total for one category in a user's spend snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: TransactionCategory,
    pub amount: Decimal,
}

impl CategoryTotal {
    pub fn new(category: TransactionCategory, amount: Decimal) -> Self {
        Self { category, amount }
    }
}

/// Published after every change to a user's snapshot. Carries the full
/// totals so a subscriber that missed updates can catch up from the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingUpdate {
    pub user_id: String,
    pub totals: Vec<CategoryTotal>,
}

/// Request body replacing a user's whole snapshot.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSpending {
    pub totals: Vec<CategoryTotal>,
}

static REPLACE_SPENDING_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![FieldRule::array("totals")
        .required()
        .max_length(TransactionCategory::ALL.len())])
});

impl Validate for ReplaceSpending {
    fn schema() -> &'static Schema {
        &REPLACE_SPENDING_SCHEMA
    }
}
