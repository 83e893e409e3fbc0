use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{apply_coin_delta, CoinAdjustment, NewUser, User, UserRepositoryTrait, UserUpdate};
use crate::errors::{DatabaseError, Error, Result};

/// In-memory user repository for service tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(id: &str, coins: i64) -> Self {
        let repo = Self::new();
        let now = Utc::now().naive_utc();
        repo.users.write().unwrap().insert(
            id.to_string(),
            User {
                id: id.to_string(),
                name: "Test User".to_string(),
                email: format!("{id}@example.com"),
                password_hash: String::new(),
                coins,
                created_at: now,
                updated_at: now,
            },
        );
        repo
    }

    pub fn coins(&self, id: &str) -> i64 {
        self.users.read().unwrap().get(id).map(|u| u.coins).unwrap_or(0)
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryUserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        self.users
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("User {user_id}")))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users.email".into()).into());
        }
        let now = Utc::now().naive_utc();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            coins: 0,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("User {user_id}")))?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        Ok(user.clone())
    }

    async fn adjust_coins(&self, user_id: &str, delta: i64) -> Result<CoinAdjustment> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("User {user_id}")))?;
        let adjustment = apply_coin_delta(user.coins, delta);
        user.coins = adjustment.balance_after;
        Ok(adjustment)
    }
}
