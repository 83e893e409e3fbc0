use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    NewTransaction, Page, Transaction, TransactionFilter, TransactionRepositoryTrait,
    TransactionStatusUpdate,
};
use crate::errors::{Error, Result};

/// In-memory transaction repository for service tests. Rows keep insertion
/// order; each insert gets a strictly later `created_at`.
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    rows: RwLock<Vec<Transaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepositoryTrait for InMemoryTransactionRepository {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Transaction {transaction_id}")))
    }

    fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|t| t.order_id.as_deref() == Some(order_id))
            .cloned())
    }

    fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Transaction>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|t| t.payment_id.as_deref() == Some(payment_id))
            .cloned())
    }

    fn list(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<(Vec<Transaction>, i64)> {
        let rows = self.rows.read().unwrap();
        let matching: Vec<_> = rows
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.category.map_or(true, |c| t.category == c))
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.payment_method.map_or(true, |m| t.payment_method == m))
            .filter(|t| filter.from.map_or(true, |d| t.created_at.date() >= d))
            .filter(|t| filter.to.map_or(true, |d| t.created_at.date() <= d))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn insert(&self, new: NewTransaction) -> Result<Transaction> {
        let mut rows = self.rows.write().unwrap();
        let now = Utc::now().naive_utc() + Duration::milliseconds(rows.len() as i64);
        let tx = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            order_id: new.order_id,
            payment_id: None,
            signature: None,
            amount: new.amount,
            refunded_amount: Decimal::ZERO,
            currency: new.currency,
            status: new.status,
            category: new.category,
            merchant: new.merchant,
            payment_method: new.payment_method,
            method_details: new.method_details,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        rows.push(tx.clone());
        Ok(tx)
    }

    async fn update_status(
        &self,
        transaction_id: &str,
        update: TransactionStatusUpdate,
    ) -> Result<Transaction> {
        let mut rows = self.rows.write().unwrap();
        let tx = rows
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {transaction_id}")))?;
        tx.apply_status(update)?;
        tx.updated_at = Utc::now().naive_utc();
        Ok(tx.clone())
    }

    async fn record_refund(&self, transaction_id: &str, amount: Decimal) -> Result<Transaction> {
        let mut rows = self.rows.write().unwrap();
        let tx = rows
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {transaction_id}")))?;
        tx.apply_refund(amount)?;
        tx.updated_at = Utc::now().naive_utc();
        Ok(tx.clone())
    }
}
