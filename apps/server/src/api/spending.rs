use std::sync::Arc;

use axum::{extract::State, routing::get, Extension, Router};
use spendquest_core::spending::{CategoryTotal, ReplaceSpending};

use crate::{
    auth::AuthUser,
    extract::ValidatedJson,
    main_lib::AppState,
    models::{ok, ApiResponse},
};

#[utoipa::path(get, path = "/api/v1/spending", responses((status = 200, body = [CategoryTotal])))]
pub async fn get_spending(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<Vec<CategoryTotal>> {
    Ok(ok(state.spending.totals(&caller.user_id)?))
}

/// Replaces the snapshot. Active goals pick up the new totals through the
/// goal-sync subscription.
#[utoipa::path(
    put,
    path = "/api/v1/spending",
    request_body = ReplaceSpending,
    responses((status = 200, body = [CategoryTotal]), (status = 400))
)]
pub async fn replace_spending(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<ReplaceSpending>,
) -> ApiResponse<Vec<CategoryTotal>> {
    let totals = state
        .spending
        .replace(&caller.user_id, body.totals)
        .await?;
    Ok(ok(totals))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/spending", get(get_spending).put(replace_spending))
}
