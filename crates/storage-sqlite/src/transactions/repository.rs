use async_trait::async_trait;
use chrono::{Duration, NaiveTime};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::TransactionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::transactions;
use crate::schema::transactions::dsl::*;
use spendquest_core::errors::{Error, Result};
use spendquest_core::transactions::{
    NewTransaction, Page, Transaction, TransactionFilter, TransactionRepositoryTrait,
    TransactionStatusUpdate,
};

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// The user's rows narrowed by `filter`. Date bounds are whole days.
fn filtered<'a>(
    owner: &'a str,
    filter: &'a TransactionFilter,
) -> transactions::BoxedQuery<'a, Sqlite> {
    let mut query = transactions.filter(user_id.eq(owner)).into_boxed();
    if let Some(c) = filter.category {
        query = query.filter(category.eq(c.as_str()));
    }
    if let Some(s) = filter.status {
        query = query.filter(status.eq(s.as_str()));
    }
    if let Some(m) = filter.payment_method {
        query = query.filter(payment_method.eq(m.as_str()));
    }
    if let Some(from) = filter.from {
        query = query.filter(created_at.ge(from.and_time(NaiveTime::MIN)));
    }
    if let Some(to) = filter.to {
        query = query.filter(created_at.lt(to.and_time(NaiveTime::MIN) + Duration::days(1)));
    }
    query
}

fn load_transaction(conn: &mut SqliteConnection, transaction_id: &str) -> Result<TransactionDB> {
    transactions
        .select(TransactionDB::as_select())
        .find(transaction_id)
        .first::<TransactionDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Transaction {}", transaction_id)))
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        load_transaction(&mut conn, transaction_id)?.try_into()
    }

    fn find_by_order_id(&self, gateway_order_id: &str) -> Result<Option<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        transactions
            .select(TransactionDB::as_select())
            .filter(order_id.eq(gateway_order_id))
            .first::<TransactionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Transaction::try_from)
            .transpose()
    }

    fn find_by_payment_id(&self, gateway_payment_id: &str) -> Result<Option<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        transactions
            .select(TransactionDB::as_select())
            .filter(payment_id.eq(gateway_payment_id))
            .first::<TransactionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Transaction::try_from)
            .transpose()
    }

    fn list(
        &self,
        owner: &str,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<(Vec<Transaction>, i64)> {
        let mut conn = get_connection(&self.pool)?;

        let total: i64 = filtered(owner, filter)
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?;

        let rows = filtered(owner, filter)
            .order((created_at.desc(), id.desc()))
            .limit(page.limit)
            .offset(page.offset())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;

        let items = rows
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn insert(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;
        self.writer
            .exec(move |conn| {
                let row: TransactionDB = new_transaction.into();
                diesel::insert_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                row.try_into()
            })
            .await
    }

    async fn update_status(
        &self,
        transaction_id: &str,
        update: TransactionStatusUpdate,
    ) -> Result<Transaction> {
        let transaction_id = transaction_id.to_string();
        self.writer
            .exec(move |conn| {
                let mut tx: Transaction = load_transaction(conn, &transaction_id)?.try_into()?;
                tx.apply_status(update)?;
                store_transition(conn, tx)
            })
            .await
    }

    async fn record_refund(&self, transaction_id: &str, refund_amount: Decimal) -> Result<Transaction> {
        let transaction_id = transaction_id.to_string();
        self.writer
            .exec(move |conn| {
                let mut tx: Transaction = load_transaction(conn, &transaction_id)?.try_into()?;
                tx.apply_refund(refund_amount)?;
                store_transition(conn, tx)
            })
            .await
    }
}

/// Writes the mutable columns of `tx`. Runs inside the writer's transaction,
/// right after the row was loaded and checked.
fn store_transition(conn: &mut SqliteConnection, mut tx: Transaction) -> Result<Transaction> {
    tx.updated_at = chrono::Utc::now().naive_utc();
    diesel::update(transactions.find(&tx.id))
        .set((
            status.eq(tx.status.as_str()),
            payment_id.eq(&tx.payment_id),
            signature.eq(&tx.signature),
            refunded_amount.eq(tx.refunded_amount.to_string()),
            updated_at.eq(tx.updated_at),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(tx)
}
