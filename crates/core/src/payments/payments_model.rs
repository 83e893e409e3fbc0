//! Payment flow models: requests, gateway records and outcomes.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::transactions::{PaymentMethod, Transaction, TransactionCategory};
use crate::validation::{FieldRule, Schema, Validate};

/// Request body for starting a gateway checkout.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    /// Major units (rupees), at most two decimal places.
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

static CREATE_ORDER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::number("amount").required().min(1.0),
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

impl Validate for CreateOrder {
    fn schema() -> &'static Schema {
        &CREATE_ORDER_SCHEMA
    }
}

/// Order creation call sent to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Minor units (paise).
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GatewayPayment {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GatewayRefund {
    pub id: String,
    pub payment_id: String,
    pub amount: i64,
    pub status: String,
}

/// Checkout callback forwarded by the client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPayment {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

static VERIFY_PAYMENT_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::string("orderId").required().min_length(1),
        FieldRule::string("paymentId").required().min_length(1),
        FieldRule::string("signature").required().min_length(1),
    ])
    .abort_early()
});

impl Validate for VerifyPayment {
    fn schema() -> &'static Schema {
        &VERIFY_PAYMENT_SCHEMA
    }
}

/// Refund request. Without an amount the whole payment is refunded.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub transaction_id: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

static REFUND_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::string("transactionId").required().min_length(1),
        FieldRule::number("amount").min(0.01),
    ])
});

impl Validate for RefundRequest {
    fn schema() -> &'static Schema {
        &REFUND_SCHEMA
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order: GatewayOrder,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundOutcome {
    pub refund: GatewayRefund,
    pub transaction: Transaction,
    /// True when the whole amount was returned and the transaction cancelled.
    pub full_refund: bool,
}
