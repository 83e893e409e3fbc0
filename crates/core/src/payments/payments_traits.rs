use async_trait::async_trait;

use super::payments_model::{
    CreateOrder, GatewayOrder, GatewayPayment, GatewayRefund, OrderCreated, OrderRequest,
    RefundRequest, RefundOutcome, VerifyPayment,
};
use crate::errors::Result;
use crate::transactions::Transaction;

/// Third-party payment gateway.
///
/// Implementations convert transport and upstream failures into
/// `PaymentError::Gateway`.
#[async_trait]
pub trait PaymentGatewayTrait: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment>;

    /// Refunds `amount` minor units, or the full payment when `None`.
    async fn refund(&self, payment_id: &str, amount: Option<i64>) -> Result<GatewayRefund>;
}

#[async_trait]
pub trait PaymentServiceTrait: Send + Sync {
    /// Creates a gateway order and a pending transaction that tracks it.
    async fn create_order(&self, user_id: &str, request: CreateOrder) -> Result<OrderCreated>;

    /// Checks the callback signature and completes the transaction.
    async fn verify_payment(&self, user_id: &str, request: VerifyPayment) -> Result<Transaction>;

    /// Fetches a payment that belongs to one of the user's transactions.
    async fn fetch_payment(&self, user_id: &str, payment_id: &str) -> Result<GatewayPayment>;

    /// Refunds part or all of what is still refundable. Refunds accumulate;
    /// the transaction is cancelled once the whole amount is returned.
    async fn refund(&self, user_id: &str, request: RefundRequest) -> Result<RefundOutcome>;
}
