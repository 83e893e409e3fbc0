use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;
use tokio::sync::{broadcast, Mutex};

use super::spending_model::{CategoryTotal, SpendingUpdate};
use crate::constants::CATEGORY_SPENDING_STORAGE_KEY;
use crate::errors::{Result, ValidationError};
use crate::local_state::{read_json_list, state_key, write_json_list, BlobStore};
use crate::transactions::TransactionCategory;
use crate::utils::money::round_currency;

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Source of truth for per-user category totals.
///
/// Every mutation persists the snapshot through the [`BlobStore`] and then
/// publishes a [`SpendingUpdate`] to subscribers.
pub struct SpendingTracker {
    store: Arc<dyn BlobStore>,
    updates: broadcast::Sender<SpendingUpdate>,
    write_lock: Mutex<()>,
}

impl SpendingTracker {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            store,
            updates,
            write_lock: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpendingUpdate> {
        self.updates.subscribe()
    }

    /// Current snapshot. An absent or unreadable snapshot is empty.
    pub fn totals(&self, user_id: &str) -> Result<Vec<CategoryTotal>> {
        read_json_list(self.store.as_ref(), &Self::key(user_id))
    }

    /// Adds `delta` (may be negative) to one category. Totals never drop below zero.
    pub async fn record(
        &self,
        user_id: &str,
        category: TransactionCategory,
        delta: Decimal,
    ) -> Result<Vec<CategoryTotal>> {
        let _guard = self.write_lock.lock().await;
        let mut totals = self.totals(user_id)?;
        match totals.iter_mut().find(|t| t.category == category) {
            Some(total) => {
                total.amount = round_currency(total.amount + delta).max(Decimal::ZERO);
            }
            None => totals.push(CategoryTotal::new(
                category,
                round_currency(delta).max(Decimal::ZERO),
            )),
        }
        self.persist(user_id, totals).await
    }

    /// Replaces the whole snapshot.
    pub async fn replace(
        &self,
        user_id: &str,
        totals: Vec<CategoryTotal>,
    ) -> Result<Vec<CategoryTotal>> {
        let mut seen = HashSet::new();
        for total in &totals {
            if total.amount.is_sign_negative() {
                return Err(ValidationError::invalid(format!(
                    "Total for {} must not be negative",
                    total.category
                ))
                .into());
            }
            if !seen.insert(total.category) {
                return Err(ValidationError::invalid(format!(
                    "Category {} appears more than once",
                    total.category
                ))
                .into());
            }
        }
        let totals = totals
            .into_iter()
            .map(|t| CategoryTotal::new(t.category, round_currency(t.amount)))
            .collect();
        let _guard = self.write_lock.lock().await;
        self.persist(user_id, totals).await
    }

    async fn persist(
        &self,
        user_id: &str,
        totals: Vec<CategoryTotal>,
    ) -> Result<Vec<CategoryTotal>> {
        write_json_list(self.store.as_ref(), &Self::key(user_id), &totals).await?;
        let update = SpendingUpdate {
            user_id: user_id.to_string(),
            totals: totals.clone(),
        };
        if self.updates.send(update).is_err() {
            debug!("No spending subscribers for user {}", user_id);
        }
        Ok(totals)
    }

    fn key(user_id: &str) -> String {
        state_key(user_id, CATEGORY_SPENDING_STORAGE_KEY)
    }
}
