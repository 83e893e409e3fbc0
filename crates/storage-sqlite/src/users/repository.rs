use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::UserDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::users;
use crate::schema::users::dsl::*;
use spendquest_core::errors::{Error, Result};
use spendquest_core::users::{
    apply_coin_delta, CoinAdjustment, NewUser, User, UserRepositoryTrait, UserUpdate,
};

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn not_found(user_id: &str) -> Error {
    Error::NotFound(format!("User {}", user_id))
}

fn load_user(conn: &mut SqliteConnection, user_id: &str) -> Result<UserDB> {
    users
        .select(UserDB::as_select())
        .find(user_id)
        .first::<UserDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| not_found(user_id))
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        load_user(&mut conn, user_id).map(User::from)
    }

    fn find_by_email(&self, user_email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let found = users
            .select(UserDB::as_select())
            .filter(email.eq(user_email))
            .first::<UserDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(found.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn| {
                let user_db: UserDB = new_user.into();
                diesel::insert_into(users::table)
                    .values(&user_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(user_db.into())
            })
            .await
    }

    async fn update(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn| {
                let mut user_db = load_user(conn, &user_id)?;
                if let Some(new_name) = update.name {
                    user_db.name = new_name;
                }
                if let Some(new_email) = update.email {
                    user_db.email = new_email;
                }
                user_db.updated_at = chrono::Utc::now().naive_utc();

                diesel::update(users.find(&user_id))
                    .set((
                        name.eq(&user_db.name),
                        email.eq(&user_db.email),
                        updated_at.eq(user_db.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(user_db.into())
            })
            .await
    }

    async fn adjust_coins(&self, user_id: &str, delta: i64) -> Result<CoinAdjustment> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn| {
                let user_db = load_user(conn, &user_id)?;
                let adjustment = apply_coin_delta(user_db.coins, delta);
                if adjustment.delta != 0 {
                    diesel::update(users.find(&user_id))
                        .set((
                            coins.eq(adjustment.balance_after),
                            updated_at.eq(chrono::Utc::now().naive_utc()),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(adjustment)
            })
            .await
    }
}
