//! Authentication routes
//!
//! Provides endpoints for registration, login, token refresh and token
//! validation. Requests are checked for presence and shape here; everything
//! else is decided by [`AuthService`](crate::services::AuthService).

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use identity_shared::validation::{
    validate_email, validate_password, validate_token, validate_username,
};
use identity_shared::{
    LoginRequest, Principal, RefreshRequest, RegisterRequest, RegisterResponse, TokenPair,
    ValidateTokenRequest,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/validate", post(validate))
        .route("/me", get(me))
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    validate_email(&req.email)?;
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    let user_id = state
        .auth()
        .register(&req.email, &req.username, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let tokens = state.auth().login(&req.email, &req.password).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new pair
///
/// POST /api/v1/auth/refresh
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    validate_token("refresh_token", &req.refresh_token)?;

    let tokens = state.auth().refresh(&req.refresh_token)?;
    Ok(Json(tokens))
}

/// Validate an access token on behalf of another service
///
/// POST /api/v1/auth/validate
async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateTokenRequest>,
) -> ApiResult<Json<Principal>> {
    validate_token("token", &req.token)?;

    let principal = state.auth().validate_token(&req.token)?;
    Ok(Json(principal))
}

/// Principal behind the caller's own access token
///
/// GET /api/v1/auth/me
async fn me(AuthUser(principal): AuthUser) -> Json<Principal> {
    Json(principal)
}
