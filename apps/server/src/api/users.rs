use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use spendquest_core::users::{LoginUser, NewUser, RegisterUser, User, UserUpdate};

use crate::{
    auth::{hash_password, verify_password, AuthError, AuthUser},
    error::ApiResult,
    extract::ValidatedJson,
    main_lib::AppState,
    models::{
        ok, ApiResponse, AuthSession, CoinBalance, Envelope, LoginBody, ProfileUpdateBody,
        RegisterBody, UserProfile,
    },
};

fn session(state: &AppState, user: User) -> ApiResult<AuthSession> {
    let access_token = state.auth.issue_token(&user.id)?;
    Ok(AuthSession {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.expires_in().as_secs(),
        user: user.into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    responses((status = 201, body = AuthSession), (status = 400), (status = 409))
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RegisterUser>,
) -> ApiResult<(StatusCode, Json<Envelope<AuthSession>>)> {
    let password_hash = hash_password(&body.password)?;
    let user = state
        .user_service
        .register(NewUser {
            name: body.name,
            email: body.email,
            password_hash,
        })
        .await?;
    tracing::info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, ok(session(&state, user)?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses((status = 200, body = AuthSession), (status = 401))
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginUser>,
) -> ApiResponse<AuthSession> {
    let user = state
        .user_service
        .find_by_email(&body.email)?
        .ok_or(AuthError::InvalidCredentials)?;
    verify_password(&user.password_hash, &body.password)?;
    Ok(ok(session(&state, user)?))
}

#[utoipa::path(get, path = "/api/v1/users/me", responses((status = 200, body = UserProfile)))]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<UserProfile> {
    let user = state.user_service.get_user(&caller.user_id)?;
    Ok(ok(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = ProfileUpdateBody,
    responses((status = 200, body = UserProfile))
)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(update): ValidatedJson<UserUpdate>,
) -> ApiResponse<UserProfile> {
    let user = state
        .user_service
        .update_profile(&caller.user_id, update)
        .await?;
    Ok(ok(user.into()))
}

#[utoipa::path(get, path = "/api/v1/users/me/coins", responses((status = 200, body = CoinBalance)))]
pub async fn get_coins(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResponse<CoinBalance> {
    let user = state.user_service.get_user(&caller.user_id)?;
    Ok(ok(CoinBalance { coins: user.coins }))
}

/// Routes reachable without a token.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(get_me).put(update_me))
        .route("/users/me/coins", get(get_coins))
}
