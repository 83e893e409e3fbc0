use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::payments_model::{
    CreateOrder, GatewayPayment, OrderCreated, OrderRequest, RefundOutcome, RefundRequest,
    VerifyPayment,
};
use super::payments_traits::{PaymentGatewayTrait, PaymentServiceTrait};
use super::signature::verify_payment_signature;
use crate::constants::{DEFAULT_ORDER_TIMEOUT, SUPPORTED_CURRENCY};
use crate::errors::{Error, PaymentError, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::spending::SpendingTracker;
use crate::transactions::{
    owned_transaction, NewTransaction, Transaction, TransactionRepositoryTrait, TransactionStatus,
    TransactionStatusUpdate,
};
use crate::utils::money::{round_currency, to_minor_units};

/// Order, verification and refund flow on top of a [`PaymentGatewayTrait`].
pub struct PaymentService {
    gateway: Arc<dyn PaymentGatewayTrait>,
    transactions: Arc<dyn TransactionRepositoryTrait>,
    spending: Arc<SpendingTracker>,
    event_sink: Arc<dyn DomainEventSink>,
    /// Shared secret used to sign checkout callbacks.
    secret: String,
    order_timeout: Duration,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGatewayTrait>,
        transactions: Arc<dyn TransactionRepositoryTrait>,
        spending: Arc<SpendingTracker>,
        event_sink: Arc<dyn DomainEventSink>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            transactions,
            spending,
            event_sink,
            secret: secret.into(),
            order_timeout: DEFAULT_ORDER_TIMEOUT,
        }
    }

    pub fn with_order_timeout(mut self, order_timeout: Duration) -> Self {
        self.order_timeout = order_timeout;
        self
    }

    async fn record_spending(&self, transaction: &Transaction, delta: Decimal) {
        if let Err(e) = self
            .spending
            .record(&transaction.user_id, transaction.category, delta)
            .await
        {
            warn!(
                "Failed to update category totals for transaction {}: {}",
                transaction.id, e
            );
        }
    }
}

#[async_trait]
impl PaymentServiceTrait for PaymentService {
    async fn create_order(&self, user_id: &str, request: CreateOrder) -> Result<OrderCreated> {
        let amount_minor = to_minor_units(request.amount)?;
        if amount_minor <= 0 {
            return Err(ValidationError::invalid("Amount must be greater than zero").into());
        }

        let mut notes = BTreeMap::new();
        notes.insert("userId".to_string(), user_id.to_string());
        notes.insert("category".to_string(), request.category.to_string());
        notes.insert("merchant".to_string(), request.merchant.trim().to_string());
        let order_request = OrderRequest {
            amount: amount_minor,
            currency: SUPPORTED_CURRENCY.to_string(),
            receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
            notes,
        };

        let order = tokio::time::timeout(self.order_timeout, self.gateway.create_order(order_request))
            .await
            .map_err(|_| PaymentError::Timeout(self.order_timeout))??;
        debug!("Gateway order {} created for user {}", order.id, user_id);

        let new_transaction = NewTransaction {
            user_id: user_id.to_string(),
            order_id: Some(order.id.clone()),
            amount: round_currency(request.amount),
            currency: SUPPORTED_CURRENCY.to_string(),
            status: TransactionStatus::Pending,
            category: request.category,
            merchant: request.merchant.trim().to_string(),
            payment_method: request.payment_method,
            method_details: request.method_details,
            notes: request.notes,
        };
        new_transaction.validate()?;
        let transaction = self.transactions.insert(new_transaction).await?;
        Ok(OrderCreated { order, transaction })
    }

    async fn verify_payment(&self, user_id: &str, request: VerifyPayment) -> Result<Transaction> {
        let transaction = self
            .transactions
            .find_by_order_id(&request.order_id)?
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| Error::NotFound(format!("Order {}", request.order_id)))?;

        match transaction.status {
            TransactionStatus::Completed => return Ok(transaction),
            TransactionStatus::Cancelled => {
                return Err(PaymentError::InvalidState(format!(
                    "Transaction {} was cancelled",
                    transaction.id
                ))
                .into())
            }
            TransactionStatus::Pending | TransactionStatus::Failed => {}
        }

        let retryable = [TransactionStatus::Pending, TransactionStatus::Failed];
        if !verify_payment_signature(
            &request.order_id,
            &request.payment_id,
            &request.signature,
            &self.secret,
        ) {
            warn!(
                "Rejected payment callback for order {} (transaction {})",
                request.order_id, transaction.id
            );
            match self
                .transactions
                .update_status(
                    &transaction.id,
                    TransactionStatusUpdate::transition(&retryable, TransactionStatus::Failed),
                )
                .await
            {
                Ok(_) => {}
                // Already completed or cancelled by a concurrent call.
                Err(Error::Payment(PaymentError::InvalidState(reason))) => {
                    debug!("Left transaction {} as is: {}", transaction.id, reason)
                }
                Err(e) => return Err(e),
            }
            self.event_sink.emit(DomainEvent::payment_failed(
                user_id,
                transaction.id.clone(),
                PaymentError::InvalidSignature.to_string(),
            ));
            return Err(PaymentError::InvalidSignature.into());
        }

        let update = TransactionStatusUpdate {
            payment_id: Some(request.payment_id),
            signature: Some(request.signature),
            ..TransactionStatusUpdate::transition(&retryable, TransactionStatus::Completed)
        };
        let completed = match self.transactions.update_status(&transaction.id, update).await {
            Ok(completed) => completed,
            Err(Error::Payment(PaymentError::InvalidState(reason))) => {
                let current = self.transactions.get_by_id(&transaction.id)?;
                if current.status == TransactionStatus::Completed {
                    debug!("Transaction {} was completed concurrently", current.id);
                    return Ok(current);
                }
                return Err(PaymentError::InvalidState(reason).into());
            }
            Err(e) => return Err(e),
        };
        info!("Transaction {} completed", completed.id);
        self.record_spending(&completed, completed.amount).await;
        self.event_sink.emit(DomainEvent::payment_completed(
            user_id,
            completed.id.clone(),
            completed.amount,
            completed.category,
        ));
        Ok(completed)
    }

    async fn fetch_payment(&self, user_id: &str, payment_id: &str) -> Result<GatewayPayment> {
        self.transactions
            .find_by_payment_id(payment_id)?
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| Error::NotFound(format!("Payment {}", payment_id)))?;
        self.gateway.fetch_payment(payment_id).await
    }

    async fn refund(&self, user_id: &str, request: RefundRequest) -> Result<RefundOutcome> {
        let transaction =
            owned_transaction(self.transactions.as_ref(), user_id, &request.transaction_id)?;
        let payment_id = match (&transaction.status, &transaction.payment_id) {
            (TransactionStatus::Completed, Some(payment_id)) => payment_id.clone(),
            _ => {
                return Err(PaymentError::InvalidState(format!(
                    "Only completed payments can be refunded (status is {})",
                    transaction.status
                ))
                .into())
            }
        };

        let refundable = transaction.refundable_amount();
        let amount = round_currency(request.amount.unwrap_or(refundable));
        if amount <= Decimal::ZERO || amount > refundable {
            return Err(ValidationError::invalid(format!(
                "Refund amount must be between 0.01 and {}",
                refundable
            ))
            .into());
        }
        // `None` asks the gateway for the whole captured amount.
        let amount_minor = if request.amount.is_none() && transaction.refunded_amount.is_zero() {
            None
        } else {
            Some(to_minor_units(amount)?)
        };

        let refund = self.gateway.refund(&payment_id, amount_minor).await?;
        info!(
            "Refund {} issued for transaction {} ({})",
            refund.id, transaction.id, amount
        );

        let transaction = self.transactions.record_refund(&transaction.id, amount).await?;
        self.record_spending(&transaction, -amount).await;
        let full_refund = transaction.status == TransactionStatus::Cancelled;

        Ok(RefundOutcome {
            refund,
            transaction,
            full_refund,
        })
    }
}
