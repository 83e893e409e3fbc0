use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::AppStateDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_state;
use crate::schema::app_state::dsl::*;
use spendquest_core::errors::Result;
use spendquest_core::local_state::BlobStore;

/// [`BlobStore`] over the `app_state` table.
pub struct AppStateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AppStateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl BlobStore for AppStateRepository {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let value = app_state
            .select(state_value)
            .find(key)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        let row = AppStateDB {
            state_key: key.to_string(),
            state_value: value,
            updated_at: chrono::Utc::now().naive_utc(),
        };
        self.writer
            .exec(move |conn| {
                diesel::replace_into(app_state::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup;
    use spendquest_core::local_state::{read_json_list, state_key as key_for, write_json_list};

    #[tokio::test]
    async fn test_write_replaces_previous_value() {
        let (_dir, pool, writer) = setup();
        let store = AppStateRepository::new(pool, writer);

        assert_eq!(store.read("u1:weeklyGoals").unwrap(), None);
        store.write("u1:weeklyGoals", "[1]".to_string()).await.unwrap();
        store.write("u1:weeklyGoals", "[2]".to_string()).await.unwrap();
        assert_eq!(store.read("u1:weeklyGoals").unwrap().as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn test_json_helpers_over_sqlite() {
        let (_dir, pool, writer) = setup();
        let store = AppStateRepository::new(pool, writer);
        let key = key_for("u1", "categorySpending");

        write_json_list(&store, &key, &["food", "bills"]).await.unwrap();
        let items: Vec<String> = read_json_list(&store, &key).unwrap();
        assert_eq!(items, vec!["food", "bills"]);

        store.write(&key, "{broken".to_string()).await.unwrap();
        let items: Vec<String> = read_json_list(&store, &key).unwrap();
        assert!(items.is_empty());
    }
}
