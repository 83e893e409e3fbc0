use std::sync::Arc;

use axum::{http::HeaderValue, middleware, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use spendquest_core::games::{
    CompareStrategiesRequest, Debt, DebtPayoffRequest, PayoffResult, PayoffStrategy, QuizAnswer,
    QuizResult, ScenarioFeedback, ScenarioView, StrategyComparison, SubmitQuiz,
};
use spendquest_core::goals::{Goal, GoalStatus, GoalUpdate, NewGoal, SettlementReport};
use spendquest_core::payments::{
    CreateOrder, GatewayOrder, GatewayPayment, GatewayRefund, OrderCreated, RefundOutcome,
    RefundRequest, VerifyPayment,
};
use spendquest_core::spending::{CategoryTotal, ReplaceSpending};
use spendquest_core::transactions::{
    CreateTransaction, PaymentMethod, Transaction, TransactionCategory, TransactionPage,
    TransactionStatus,
};
use spendquest_core::users::CoinAdjustment;
use utoipa::OpenApi;

use crate::{
    auth::require_jwt,
    config::Config,
    main_lib::AppState,
    models::{
        AuthSession, CoinBalance, LoginBody, ProfileUpdateBody, RegisterBody, UserProfile,
    },
};

pub mod games;
pub mod goals;
pub mod payments;
pub mod spending;
pub mod transactions;
pub mod users;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        readyz,
        users::register,
        users::login,
        users::get_me,
        users::update_me,
        users::get_coins,
        transactions::list_transactions,
        transactions::create_transaction,
        transactions::get_transaction,
        transactions::cancel_transaction,
        payments::create_order,
        payments::verify_payment,
        payments::fetch_payment,
        payments::refund,
        goals::get_goals,
        goals::create_goal,
        goals::update_goal,
        goals::delete_goal,
        goals::settle_goals,
        spending::get_spending,
        spending::replace_spending,
        games::simulate_payoff,
        games::compare_strategies,
        games::list_scenarios,
        games::submit_quiz
    ),
    components(schemas(
        AuthSession,
        CoinBalance,
        LoginBody,
        ProfileUpdateBody,
        RegisterBody,
        UserProfile,
        Transaction,
        TransactionPage,
        TransactionStatus,
        TransactionCategory,
        PaymentMethod,
        CreateTransaction,
        CreateOrder,
        OrderCreated,
        GatewayOrder,
        GatewayPayment,
        GatewayRefund,
        VerifyPayment,
        RefundRequest,
        RefundOutcome,
        Goal,
        GoalStatus,
        NewGoal,
        GoalUpdate,
        SettlementReport,
        CoinAdjustment,
        CategoryTotal,
        ReplaceSpending,
        Debt,
        PayoffStrategy,
        PayoffResult,
        DebtPayoffRequest,
        CompareStrategiesRequest,
        StrategyComparison,
        ScenarioView,
        QuizAnswer,
        SubmitQuiz,
        ScenarioFeedback,
        QuizResult
    )),
    tags((name = "spendquest"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    let protected = Router::new()
        .merge(users::router())
        .merge(transactions::router())
        .merge(payments::router())
        .merge(goals::router())
        .merge(spending::router())
        .merge(games::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_jwt));

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(users::public_router())
        .merge(protected);

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
