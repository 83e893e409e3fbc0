use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use spendquest_core::transactions::{
    PageRequest, PaymentMethod, TransactionCategory, TransactionFilter, TransactionStatus,
};
use spendquest_core::users as core_users;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiResult;

/// Success half of the response envelope.
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

pub type ApiResponse<T> = ApiResult<Json<Envelope<T>>>;

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub coins: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<core_users::User> for UserProfile {
    fn from(u: core_users::User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            coins: u.coins,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserProfile,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub coins: i64,
}

/// Registration body as documented in the OpenAPI schema.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Query string accepted by the transaction listing.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    pub category: Option<TransactionCategory>,
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl TransactionQuery {
    pub fn into_parts(self) -> (TransactionFilter, PageRequest) {
        (
            TransactionFilter {
                category: self.category,
                status: self.status,
                payment_method: self.payment_method,
                from: self.from,
                to: self.to,
            },
            PageRequest {
                page: self.page,
                limit: self.limit,
            },
        )
    }
}
