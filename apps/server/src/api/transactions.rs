use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use spendquest_core::transactions::{CreateTransaction, Transaction, TransactionPage};

use crate::{
    auth::AuthUser,
    error::ApiResult,
    extract::ValidatedJson,
    main_lib::AppState,
    models::{ok, ApiResponse, Envelope, TransactionQuery},
};

#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(TransactionQuery),
    responses((status = 200, body = TransactionPage), (status = 400))
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> ApiResponse<TransactionPage> {
    let Query(query) = query?;
    let (filter, page) = query.into_parts();
    let result = state
        .transaction_service
        .list_transactions(&caller.user_id, filter, page)?;
    Ok(ok(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransaction,
    responses((status = 201, body = Transaction), (status = 400))
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateTransaction>,
) -> ApiResult<(StatusCode, Json<Envelope<Transaction>>)> {
    let tx = state
        .transaction_service
        .create_transaction(&caller.user_id, body)
        .await?;
    Ok((StatusCode::CREATED, ok(tx)))
}

#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(("id" = String, Path, description = "Transaction ID")),
    responses((status = 200, body = Transaction), (status = 404))
)]
pub async fn get_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<Transaction> {
    let tx = state
        .transaction_service
        .get_transaction(&caller.user_id, &id)?;
    Ok(ok(tx))
}

#[utoipa::path(
    post,
    path = "/api/v1/transactions/{id}/cancel",
    params(("id" = String, Path, description = "Transaction ID")),
    responses((status = 200, body = Transaction), (status = 404), (status = 409))
)]
pub async fn cancel_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<Transaction> {
    let tx = state
        .transaction_service
        .cancel_transaction(&caller.user_id, &id)
        .await?;
    Ok(ok(tx))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}/cancel", post(cancel_transaction))
}
