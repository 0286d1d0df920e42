/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Register and log in
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
///
/// Logout is client-side: the client discards its tokens.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Json};
use lostfound_shared::{
    auth::jwt,
    lifecycle::accounts::{self, RegisterInput},
    models::user::User,
};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Tokens plus the account they belong to
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Always `Bearer`
    pub token_type: &'static str,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,

    pub token_type: &'static str,
}

fn token_response(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let (access_token, refresh_token) =
        jwt::issue_token_pair(user.id, &user.username, state.jwt_secret())?;

    Ok(AuthResponse {
        user,
        access_token,
        refresh_token,
        token_type: "Bearer",
    })
}

/// Register a new user
///
/// ```text
/// POST /v1/auth/register
///
/// { "username": "alice", "email": "alice@example.com", "password": "correct horse" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: invalid username/email, weak password, or username taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterInput>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = accounts::register(state.store(), req).await?;
    let response = token_response(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = accounts::authenticate(state.store(), &req.username, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(token_response(&state, user)?))
}

/// Token refresh endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer",
    }))
}
