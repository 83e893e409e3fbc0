use async_trait::async_trait;
use rust_decimal::Decimal;

use super::transactions_model::{
    CreateTransaction, NewTransaction, Page, PageRequest, Transaction, TransactionFilter,
    TransactionPage, TransactionStatusUpdate,
};
use crate::errors::Result;

/// Persistence contract for transactions.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;

    fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>>;

    fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Transaction>>;

    /// Returns one page of the user's transactions (newest first) and the
    /// total number of rows matching `filter`.
    fn list(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<(Vec<Transaction>, i64)>;

    async fn insert(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Compare-and-set on the status: the read, the check against
    /// `update.from` and the write happen as one atomic step.
    async fn update_status(
        &self,
        transaction_id: &str,
        update: TransactionStatusUpdate,
    ) -> Result<Transaction>;

    /// Atomically adds a refund to a completed transaction; see
    /// [`Transaction::apply_refund`].
    async fn record_refund(&self, transaction_id: &str, amount: Decimal) -> Result<Transaction>;
}

#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Records a manual transaction. It stays pending until a verified
    /// gateway callback completes it.
    async fn create_transaction(
        &self,
        user_id: &str,
        request: CreateTransaction,
    ) -> Result<Transaction>;

    fn list_transactions(
        &self,
        user_id: &str,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<TransactionPage>;

    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction>;

    async fn cancel_transaction(&self, user_id: &str, transaction_id: &str)
        -> Result<Transaction>;
}
