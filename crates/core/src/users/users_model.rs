//! User domain models.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{FieldRule, Schema, Validate};

pub(crate) const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Domain model representing a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Virtual currency balance; never negative.
    pub coins: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for persisting a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

static REGISTER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::string("name").required().length(2, 50),
        FieldRule::string("email")
            .required()
            .max_length(254)
            .pattern(EMAIL_PATTERN),
        FieldRule::string("password").required().length(8, 128),
    ])
});

impl Validate for RegisterUser {
    fn schema() -> &'static Schema {
        &REGISTER_SCHEMA
    }
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

static LOGIN_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::string("email").required().pattern(EMAIL_PATTERN),
        FieldRule::string("password").required().min_length(1),
    ])
    .abort_early()
});

impl Validate for LoginUser {
    fn schema() -> &'static Schema {
        &LOGIN_SCHEMA
    }
}

/// Profile mutation. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

static USER_UPDATE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        FieldRule::string("name").length(2, 50),
        FieldRule::string("email")
            .max_length(254)
            .pattern(EMAIL_PATTERN),
    ])
});

impl Validate for UserUpdate {
    fn schema() -> &'static Schema {
        &USER_UPDATE_SCHEMA
    }
}

/// Result of applying a signed coin delta to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoinAdjustment {
    pub balance_before: i64,
    pub balance_after: i64,
    /// The change actually applied; debits are clamped so the balance stays >= 0.
    pub delta: i64,
}

/// Applies `delta` to `balance`, never letting the balance drop below zero.
pub fn apply_coin_delta(balance: i64, delta: i64) -> CoinAdjustment {
    let balance_before = balance.max(0);
    let balance_after = balance_before.saturating_add(delta).max(0);
    CoinAdjustment {
        balance_before,
        balance_after,
        delta: balance_after - balance_before,
    }
}

/// Canonical form used for uniqueness checks and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
