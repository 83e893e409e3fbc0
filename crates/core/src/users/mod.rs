//! Users module - accounts, credentials and coin balances.

mod users_model;
mod users_service;
mod users_traits;

#[cfg(test)]
pub(crate) mod testing;

pub use users_model::{
    apply_coin_delta, normalize_email, CoinAdjustment, LoginUser, NewUser, RegisterUser, User,
    UserUpdate,
};
pub use users_service::UserService;
pub use users_traits::{UserRepositoryTrait, UserServiceTrait};
