//! Transaction domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::errors::{PaymentError, Result, ValidationError};
use crate::validation::{FieldRule, Schema, Validate};

/// Lifecycle of a payment record. Records are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: &'static [&'static str] = &["pending", "completed", "failed", "cancelled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Spending category (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Food,
    Shopping,
    Transport,
    Entertainment,
    Bills,
    Health,
    Education,
    Other,
}

impl TransactionCategory {
    pub const ALL: &'static [&'static str] = &[
        "food",
        "shopping",
        "transport",
        "entertainment",
        "bills",
        "health",
        "education",
        "other",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Shopping => "shopping",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Bills => "bills",
            Self::Health => "health",
            Self::Education => "education",
            Self::Other => "other",
        }
    }
}

/// Payment instrument (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    Netbanking,
    Wallet,
    Emi,
}

impl PaymentMethod {
    pub const ALL: &'static [&'static str] = &["card", "upi", "netbanking", "wallet", "emi"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Upi => "upi",
            Self::Netbanking => "netbanking",
            Self::Wallet => "wallet",
            Self::Emi => "emi",
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ident, $label:literal, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case(Self::$variant.as_str()) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(ValidationError::invalid(format!(
                    "Unknown {} '{}'",
                    $label, s
                )))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_str_enum!(TransactionStatus, "transaction status", [Pending, Completed, Failed, Cancelled]);
impl_str_enum!(
    TransactionCategory,
    "category",
    [Food, Shopping, Transport, Entertainment, Bills, Health, Education, Other]
);
impl_str_enum!(PaymentMethod, "payment method", [Card, Upi, Netbanking, Wallet, Emi]);

/// Domain model representing a payment record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    /// Gateway order id; unique when present.
    pub order_id: Option<String>,
    /// Gateway payment id; unique when present.
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub amount: Decimal,
    /// Sum of refunds issued so far; never exceeds `amount`.
    #[serde(default)]
    pub refunded_amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub category: TransactionCategory,
    pub merchant: String,
    pub payment_method: PaymentMethod,
    #[schema(value_type = Option<Object>)]
    pub method_details: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Request body for recording a transaction manually.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub amount: Decimal,
    pub category: TransactionCategory,
    pub merchant: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub method_details: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

static CREATE_TRANSACTION_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::number("amount").required().min(0.0),
        FieldRule::string("category")
            .required()
            .one_of(TransactionCategory::ALL),
        FieldRule::string("merchant").required().length(1, 100),
        FieldRule::string("paymentMethod")
            .required()
            .one_of(PaymentMethod::ALL),
        FieldRule::object("methodDetails"),
        FieldRule::string("notes").max_length(500),
    ])
});

impl Validate for CreateTransaction {
    fn schema() -> &'static Schema {
        &CREATE_TRANSACTION_SCHEMA
    }
}

/// Input model for persisting a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub order_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub category: TransactionCategory,
    pub merchant: String,
    pub payment_method: PaymentMethod,
    pub method_details: Option<serde_json::Value>,
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Validates the new transaction data.
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_sign_negative() {
            return Err(ValidationError::invalid("Amount cannot be negative").into());
        }
        if self.merchant.trim().is_empty() {
            return Err(ValidationError::MissingField("merchant".to_string()).into());
        }
        Ok(())
    }
}

/// Status transition applied to an existing transaction.
///
/// The transition only happens when the stored status is one of `from`;
/// otherwise it is refused with `PaymentError::InvalidState`.
#[derive(Debug, Clone, Default)]
pub struct TransactionStatusUpdate {
    pub from: Vec<TransactionStatus>,
    pub status: TransactionStatus,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

impl TransactionStatusUpdate {
    pub fn transition(from: &[TransactionStatus], status: TransactionStatus) -> Self {
        Self {
            from: from.to_vec(),
            status,
            ..Default::default()
        }
    }
}

impl Transaction {
    /// Amount still available for refunds.
    pub fn refundable_amount(&self) -> Decimal {
        (self.amount - self.refunded_amount).max(Decimal::ZERO)
    }

    /// Applies `update` if the current status allows it.
    pub fn apply_status(&mut self, update: TransactionStatusUpdate) -> Result<()> {
        if !update.from.contains(&self.status) {
            return Err(PaymentError::InvalidState(format!(
                "Transaction {} is {}, cannot become {}",
                self.id, self.status, update.status
            ))
            .into());
        }
        self.status = update.status;
        if update.payment_id.is_some() {
            self.payment_id = update.payment_id;
        }
        if update.signature.is_some() {
            self.signature = update.signature;
        }
        Ok(())
    }

    /// Adds a refund of `amount` to a completed transaction. Refunding the
    /// last of the amount cancels it.
    pub fn apply_refund(&mut self, amount: Decimal) -> Result<()> {
        if self.status != TransactionStatus::Completed {
            return Err(PaymentError::InvalidState(format!(
                "Only completed payments can be refunded (status is {})",
                self.status
            ))
            .into());
        }
        let refundable = self.refundable_amount();
        if amount <= Decimal::ZERO || amount > refundable {
            return Err(ValidationError::invalid(format!(
                "Refund amount must be between 0.01 and {}",
                refundable
            ))
            .into());
        }
        self.refunded_amount += amount;
        if self.refunded_amount == self.amount {
            self.status = TransactionStatus::Cancelled;
        }
        Ok(())
    }
}

/// Listing filter. Date bounds are inclusive and compared against `created_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub category: Option<TransactionCategory>,
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ValidationError::invalid("\"from\" must not be after \"to\"").into());
            }
        }
        Ok(())
    }
}

/// Raw page/limit query values.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Page bounds after defaults were applied and ranges checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl PageRequest {
    pub fn normalize(self) -> Result<Page> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page < 1 {
            return Err(ValidationError::invalid("\"page\" must be greater than or equal to 1").into());
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ValidationError::invalid(format!(
                "\"limit\" must be between 1 and {}",
                MAX_PAGE_LIMIT
            ))
            .into());
        }
        Ok(Page { page, limit })
    }
}

/// One page of transactions, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl TransactionPage {
    pub fn new(items: Vec<Transaction>, page: Page, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page.limit - 1) / page.limit
        };
        Self {
            items,
            page: page.page,
            limit: page.limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    #[test]
    fn test_enums_round_trip_through_strings() {
        for s in TransactionCategory::ALL {
            assert_eq!(TransactionCategory::from_str(s).unwrap().as_str(), *s);
        }
        for s in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::from_str(s).unwrap().to_string(), *s);
        }
        assert_eq!(
            TransactionStatus::from_str("COMPLETED").unwrap(),
            TransactionStatus::Completed
        );
        assert!(TransactionCategory::from_str("crypto").is_err());
    }

    #[test]
    fn test_create_schema_rejects_unknown_category() {
        let payload = json!({
            "amount": 250,
            "category": "crypto",
            "merchant": "Cafe",
            "paymentMethod": "upi"
        });
        let err = validate(<CreateTransaction as Validate>::schema(), payload).unwrap_err();
        assert!(err.to_string().starts_with("\"category\" must be one of [food"));
    }

    #[test]
    fn test_page_request_defaults_and_bounds() {
        let page = PageRequest::default().normalize().unwrap();
        assert_eq!(page, Page { page: 1, limit: 20 });
        assert_eq!(Page { page: 3, limit: 10 }.offset(), 20);

        assert!(PageRequest { page: Some(0), limit: None }.normalize().is_err());
        assert!(PageRequest { page: None, limit: Some(101) }.normalize().is_err());
    }

    #[test]
    fn test_page_counts() {
        let page = Page { page: 1, limit: 20 };
        assert_eq!(TransactionPage::new(vec![], page, 0).total_pages, 0);
        assert_eq!(TransactionPage::new(vec![], page, 41).total_pages, 3);
    }

    #[test]
    fn test_filter_rejects_inverted_range() {
        let filter = TransactionFilter {
            from: NaiveDate::from_ymd_opt(2026, 10, 10),
            to: NaiveDate::from_ymd_opt(2026, 10, 1),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    fn completed(amount: Decimal) -> Transaction {
        Transaction {
            id: "t1".into(),
            user_id: "u1".into(),
            order_id: Some("order_1".into()),
            payment_id: Some("pay_1".into()),
            signature: None,
            amount,
            refunded_amount: Decimal::ZERO,
            currency: "INR".into(),
            status: TransactionStatus::Completed,
            category: TransactionCategory::Food,
            merchant: "Cafe".into(),
            payment_method: PaymentMethod::Upi,
            method_details: None,
            notes: None,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_apply_status_refuses_unexpected_current_status() {
        let mut tx = completed(Decimal::from(250));
        let err = tx
            .apply_status(TransactionStatusUpdate::transition(
                &[TransactionStatus::Pending, TransactionStatus::Failed],
                TransactionStatus::Failed,
            ))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Payment(PaymentError::InvalidState(_))));
        assert_eq!(tx.status, TransactionStatus::Completed);

        tx.apply_status(TransactionStatusUpdate::transition(
            &[TransactionStatus::Completed],
            TransactionStatus::Cancelled,
        ))
        .unwrap();
        assert_eq!(tx.status, TransactionStatus::Cancelled);
    }

    #[test]
    fn test_partial_refunds_accumulate_until_cancelled() {
        let mut tx = completed(Decimal::from(250));
        tx.apply_refund(Decimal::from(50)).unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.refundable_amount(), Decimal::from(200));

        let err = tx.apply_refund(Decimal::from(250)).unwrap_err();
        assert!(err.to_string().contains("between 0.01 and 200"));

        tx.apply_refund(Decimal::from(200)).unwrap();
        assert_eq!(tx.refunded_amount, Decimal::from(250));
        assert_eq!(tx.status, TransactionStatus::Cancelled);
        assert!(tx.apply_refund(Decimal::ONE).is_err());
    }
}
