//! Database model for transactions.

use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use spendquest_core::errors::{Error, Result};
use spendquest_core::transactions::{
    NewTransaction, PaymentMethod, Transaction, TransactionCategory, TransactionStatus,
};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    /// Decimal stored as text to keep exact paise.
    pub amount: String,
    pub refunded_amount: String,
    pub currency: String,
    pub status: String,
    pub category: String,
    pub merchant: String,
    pub payment_method: String,
    /// JSON object as text.
    pub method_details: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDB) -> Result<Self> {
        let method_details = db
            .method_details
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| {
                StorageError::SerializationError(format!(
                    "Invalid method details on transaction {}: {}",
                    db.id, e
                ))
            })?;
        Ok(Self {
            amount: Decimal::from_str(&db.amount)?,
            refunded_amount: Decimal::from_str(&db.refunded_amount)?,
            status: TransactionStatus::from_str(&db.status)?,
            category: TransactionCategory::from_str(&db.category)?,
            payment_method: PaymentMethod::from_str(&db.payment_method)?,
            method_details,
            id: db.id,
            user_id: db.user_id,
            order_id: db.order_id,
            payment_id: db.payment_id,
            signature: db.signature,
            currency: db.currency,
            merchant: db.merchant,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewTransaction> for TransactionDB {
    fn from(domain: NewTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: domain.user_id,
            order_id: domain.order_id,
            payment_id: None,
            signature: None,
            amount: domain.amount.to_string(),
            refunded_amount: Decimal::ZERO.to_string(),
            currency: domain.currency,
            status: domain.status.as_str().to_string(),
            category: domain.category.as_str().to_string(),
            merchant: domain.merchant,
            payment_method: domain.payment_method.as_str().to_string(),
            method_details: domain.method_details.map(|v| v.to_string()),
            notes: domain.notes,
            created_at: now,
            updated_at: now,
        }
    }
}
