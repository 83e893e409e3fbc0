//! User repository and service traits.

use async_trait::async_trait;

use super::users_model::{CoinAdjustment, NewUser, User, UserUpdate};
use crate::errors::Result;

/// Persistence contract for users.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str) -> Result<User>;

    /// Looks a user up by normalized email.
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create(&self, new_user: NewUser) -> Result<User>;

    async fn update(&self, user_id: &str, update: UserUpdate) -> Result<User>;

    /// Applies a signed coin delta in a single write transaction.
    ///
    /// The resulting balance is clamped at zero; the returned adjustment
    /// reports the delta actually applied.
    async fn adjust_coins(&self, user_id: &str, delta: i64) -> Result<CoinAdjustment>;
}

#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Registers a user. The password must already be hashed.
    async fn register(&self, new_user: NewUser) -> Result<User>;

    fn get_user(&self, user_id: &str) -> Result<User>;

    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn update_profile(&self, user_id: &str, update: UserUpdate) -> Result<User>;

    async fn adjust_coins(&self, user_id: &str, delta: i64) -> Result<CoinAdjustment>;
}
