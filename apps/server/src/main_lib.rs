use std::sync::Arc;

use crate::{auth::AuthManager, config::Config, domain_events::TracingDomainEventSink};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use spendquest_core::{
    events::DomainEventSink,
    games::{GameService, GameServiceTrait},
    goals::{GoalService, GoalServiceTrait},
    local_state::BlobStore,
    payments::{PaymentGatewayTrait, PaymentService, PaymentServiceTrait},
    spending::{GoalSyncSubscription, SpendingTracker},
    transactions::{TransactionService, TransactionServiceTrait},
    users::{UserRepositoryTrait, UserService, UserServiceTrait},
};
use spendquest_gateway::GatewayClient;
use spendquest_storage_sqlite::{
    db::{self, spawn_writer},
    AppStateRepository, TransactionRepository, UserRepository,
};

pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub payment_service: Arc<dyn PaymentServiceTrait>,
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub game_service: Arc<dyn GameServiceTrait>,
    pub spending: Arc<SpendingTracker>,
    pub auth: Arc<AuthManager>,
    pub db_path: String,
    /// Keeps active goals in step with category totals. Dropped with the state.
    _goal_sync: GoalSyncSubscription,
}

pub fn init_tracing() {
    let log_format = std::env::var("SQ_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let gateway = Arc::new(GatewayClient::new(config.gateway.clone())?);
    build_state_with_gateway(config, gateway).await
}

/// Wires repositories and services around the given payment gateway.
pub async fn build_state_with_gateway(
    config: &Config,
    gateway: Arc<dyn PaymentGatewayTrait>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let domain_event_sink: Arc<dyn DomainEventSink> = Arc::new(TracingDomainEventSink::new());

    let user_repository: Arc<dyn UserRepositoryTrait> =
        Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let blobs: Arc<dyn BlobStore> = Arc::new(AppStateRepository::new(pool.clone(), writer.clone()));

    let spending = Arc::new(SpendingTracker::new(blobs.clone()));

    let user_service: Arc<dyn UserServiceTrait> = Arc::new(UserService::new(
        user_repository.clone(),
        domain_event_sink.clone(),
    ));

    let transaction_service: Arc<dyn TransactionServiceTrait> =
        Arc::new(TransactionService::new(transaction_repository.clone()));

    let payment_service: Arc<dyn PaymentServiceTrait> = Arc::new(
        PaymentService::new(
            gateway,
            transaction_repository,
            spending.clone(),
            domain_event_sink.clone(),
            config.gateway.key_secret.clone(),
        )
        .with_order_timeout(config.order_timeout),
    );

    let goal_service: Arc<dyn GoalServiceTrait> = Arc::new(GoalService::new(
        blobs.clone(),
        spending.clone(),
        user_repository,
        domain_event_sink,
    ));

    let game_service: Arc<dyn GameServiceTrait> =
        Arc::new(GameService::new(user_service.clone(), blobs));

    // Must be spawned inside the runtime; lives as long as the state.
    let goal_sync = GoalSyncSubscription::spawn(&spending, goal_service.clone());

    let auth = Arc::new(AuthManager::new(&config.jwt_secret, config.token_ttl));

    Ok(Arc::new(AppState {
        user_service,
        transaction_service,
        payment_service,
        goal_service,
        game_service,
        spending,
        auth,
        db_path,
        _goal_sync: goal_sync,
    }))
}
