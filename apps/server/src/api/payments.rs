use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use spendquest_core::payments::{
    CreateOrder, GatewayPayment, OrderCreated, RefundOutcome, RefundRequest, VerifyPayment,
};
use spendquest_core::transactions::Transaction;

use crate::{
    auth::AuthUser,
    error::ApiResult,
    extract::ValidatedJson,
    main_lib::AppState,
    models::{ok, ApiResponse, Envelope},
};

#[utoipa::path(
    post,
    path = "/api/v1/payments/orders",
    request_body = CreateOrder,
    responses((status = 201, body = OrderCreated), (status = 400), (status = 502))
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateOrder>,
) -> ApiResult<(StatusCode, Json<Envelope<OrderCreated>>)> {
    let created = state
        .payment_service
        .create_order(&caller.user_id, body)
        .await?;
    Ok((StatusCode::CREATED, ok(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body = VerifyPayment,
    responses((status = 200, body = Transaction), (status = 400), (status = 404), (status = 409))
)]
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<VerifyPayment>,
) -> ApiResponse<Transaction> {
    let tx = state
        .payment_service
        .verify_payment(&caller.user_id, body)
        .await?;
    Ok(ok(tx))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}",
    params(("payment_id" = String, Path, description = "Gateway payment ID")),
    responses((status = 200, body = GatewayPayment), (status = 404))
)]
pub async fn fetch_payment(
    Path(payment_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<GatewayPayment> {
    let payment = state
        .payment_service
        .fetch_payment(&caller.user_id, &payment_id)
        .await?;
    Ok(ok(payment))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/refunds",
    request_body = RefundRequest,
    responses((status = 200, body = RefundOutcome), (status = 400), (status = 404), (status = 409))
)]
pub async fn refund(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<RefundRequest>,
) -> ApiResponse<RefundOutcome> {
    let outcome = state.payment_service.refund(&caller.user_id, body).await?;
    Ok(ok(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/orders", post(create_order))
        .route("/payments/verify", post(verify_payment))
        .route("/payments/refunds", post(refund))
        .route("/payments/{payment_id}", get(fetch_payment))
}
