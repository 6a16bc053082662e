//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::models::{
    LoginRequest, LogoutResponse, RefreshResponse, RefreshTokenRequest, SignupRequest,
    SignupResponse, TokenResponse,
};
use crate::services::auth;

/// `POST /api/signup`: create a new user account.
pub async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let user = auth::register(
        state.credentials.as_ref(),
        &body.name,
        &body.family_name,
        &body.email,
        &body.password,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Account created".to_string(),
            user,
        }),
    ))
}

/// `POST /api/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(
        state.credentials.as_ref(),
        state.sessions.as_ref(),
        &state.config,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /api/refresh`: exchange a refresh token for a new access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshTokenRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let resp = auth::refresh(
        state.credentials.as_ref(),
        state.sessions.as_ref(),
        &state.config,
        &body.refresh_token,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /api/logout`: revoke a refresh token.
pub async fn logout_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshTokenRequest>,
) -> AppResult<Json<LogoutResponse>> {
    let resp = auth::logout(state.sessions.as_ref(), &body.refresh_token).await?;
    Ok(Json(resp))
}
