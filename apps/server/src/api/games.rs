use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use spendquest_core::games::{
    CompareStrategiesRequest, DebtPayoffRequest, PayoffResult, QuizResult, ScenarioView,
    StrategyComparison, SubmitQuiz,
};

use crate::{
    auth::AuthUser,
    extract::ValidatedJson,
    main_lib::AppState,
    models::{ok, ApiResponse},
};

#[utoipa::path(
    post,
    path = "/api/v1/games/debt-payoff",
    request_body = DebtPayoffRequest,
    responses((status = 200, body = PayoffResult), (status = 400))
)]
pub async fn simulate_payoff(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<DebtPayoffRequest>,
) -> ApiResponse<PayoffResult> {
    let result = state.game_service.simulate_payoff(
        &body.debts,
        body.extra_monthly_payment,
        body.strategy,
    )?;
    Ok(ok(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/games/debt-payoff/compare",
    request_body = CompareStrategiesRequest,
    responses((status = 200, body = StrategyComparison), (status = 400))
)]
pub async fn compare_strategies(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CompareStrategiesRequest>,
) -> ApiResponse<StrategyComparison> {
    let comparison = state
        .game_service
        .compare_strategies(&body.debts, body.extra_monthly_payment)?;
    Ok(ok(comparison))
}

#[utoipa::path(get, path = "/api/v1/games/scenarios", responses((status = 200, body = [ScenarioView])))]
pub async fn list_scenarios(State(state): State<Arc<AppState>>) -> ApiResponse<Vec<ScenarioView>> {
    Ok(ok(state.game_service.list_scenarios()))
}

#[utoipa::path(
    post,
    path = "/api/v1/games/scenarios/submit",
    request_body = SubmitQuiz,
    responses((status = 200, body = QuizResult), (status = 400))
)]
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<SubmitQuiz>,
) -> ApiResponse<QuizResult> {
    let result = state
        .game_service
        .submit_quiz(&caller.user_id, &body.answers)
        .await?;
    Ok(ok(result))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/games/debt-payoff", post(simulate_payoff))
        .route("/games/debt-payoff/compare", post(compare_strategies))
        .route("/games/scenarios", get(list_scenarios))
        .route("/games/scenarios/submit", post(submit_quiz))
}
