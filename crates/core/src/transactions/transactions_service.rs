use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::transactions_model::{
    CreateTransaction, NewTransaction, PageRequest, Transaction, TransactionFilter,
    TransactionPage, TransactionStatus, TransactionStatusUpdate,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::constants::SUPPORTED_CURRENCY;
use crate::errors::{Error, PaymentError, Result};
use crate::utils::money::round_currency;

pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

/// Loads a transaction and hides it from anyone but its owner.
pub(crate) fn owned_transaction(
    repository: &dyn TransactionRepositoryTrait,
    user_id: &str,
    transaction_id: &str,
) -> Result<Transaction> {
    let transaction = repository.get_by_id(transaction_id)?;
    if transaction.user_id != user_id {
        return Err(Error::NotFound(format!("Transaction {}", transaction_id)));
    }
    Ok(transaction)
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn create_transaction(
        &self,
        user_id: &str,
        request: CreateTransaction,
    ) -> Result<Transaction> {
        let new_transaction = NewTransaction {
            user_id: user_id.to_string(),
            order_id: None,
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
        self.repository.insert(new_transaction).await
    }

    fn list_transactions(
        &self,
        user_id: &str,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<TransactionPage> {
        filter.validate()?;
        let page = page.normalize()?;
        let (items, total) = self.repository.list(user_id, &filter, page)?;
        Ok(TransactionPage::new(items, page, total))
    }

    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        owned_transaction(self.repository.as_ref(), user_id, transaction_id)
    }

    async fn cancel_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
    ) -> Result<Transaction> {
        let transaction = owned_transaction(self.repository.as_ref(), user_id, transaction_id)?;
        if transaction.status != TransactionStatus::Pending {
            return Err(PaymentError::InvalidState(format!(
                "Only pending transactions can be cancelled (status is {})",
                transaction.status
            ))
            .into());
        }
        debug!("Cancelling transaction {}", transaction_id);
        self.repository
            .update_status(
                transaction_id,
                TransactionStatusUpdate::transition(
                    &[TransactionStatus::Pending],
                    TransactionStatus::Cancelled,
                ),
            )
            .await
    }
}
