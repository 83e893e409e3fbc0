use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use spendquest_core::goals::{Goal, GoalUpdate, NewGoal, SettlementReport};

use crate::{
    auth::AuthUser,
    error::ApiResult,
    extract::ValidatedJson,
    main_lib::AppState,
    models::{ok, ApiResponse, Envelope},
};

/// Lists goals, settling any whose week has already ended.
#[utoipa::path(get, path = "/api/v1/goals", responses((status = 200, body = [Goal])))]
pub async fn get_goals(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<Vec<Goal>> {
    let goals = state
        .goal_service
        .list_goals(&caller.user_id, Utc::now())
        .await?;
    Ok(ok(goals))
}

#[utoipa::path(
    post,
    path = "/api/v1/goals",
    request_body = NewGoal,
    responses((status = 201, body = Goal), (status = 400))
)]
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(goal): ValidatedJson<NewGoal>,
) -> ApiResult<(StatusCode, Json<Envelope<Goal>>)> {
    let g = state
        .goal_service
        .create_goal(&caller.user_id, goal, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, ok(g)))
}

#[utoipa::path(
    put,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal ID")),
    request_body = GoalUpdate,
    responses((status = 200, body = Goal), (status = 404), (status = 409))
)]
pub async fn update_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(update): ValidatedJson<GoalUpdate>,
) -> ApiResponse<Goal> {
    let g = state
        .goal_service
        .update_goal(&caller.user_id, &id, update)
        .await?;
    Ok(ok(g))
}

#[utoipa::path(
    delete,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal ID")),
    responses((status = 200, description = "Deleted goal id"), (status = 404))
)]
pub async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<Value> {
    state.goal_service.delete_goal(&caller.user_id, &id).await?;
    Ok(ok(json!({ "id": id })))
}

#[utoipa::path(
    post,
    path = "/api/v1/goals/settle",
    responses((status = 200, body = [SettlementReport]))
)]
pub async fn settle_goals(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<Vec<SettlementReport>> {
    let reports = state
        .goal_service
        .settle_goals(&caller.user_id, Utc::now())
        .await?;
    Ok(ok(reports))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(get_goals).post(create_goal))
        .route("/goals/settle", post(settle_goals))
        .route("/goals/{id}", put(update_goal).delete(delete_goal))
}
