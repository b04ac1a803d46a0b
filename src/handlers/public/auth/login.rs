// handlers/public/auth/login.rs - POST /api/v1/users/login

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use axum_extra::extract::CookieJar;

use super::utils::{normalize_email, required, set_session_cookies, verify_password, LoginRequest, SessionResponse};
use crate::app::AppState;
use crate::auth::{issue_tokens, token_digest};
use crate::error::ApiError;
use crate::middleware::ApiResponse;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Verifies credentials, then issues a token pair as cookies and in the body.
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<SessionResponse>), ApiError> {
    let Json(payload) = payload?;

    let email = normalize_email(required(&payload.email, "email")?);
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::field_error("password", "password is required"))?;

    let Some(user) = state.users.find_by_email(&email).await? else {
        tracing::info!("Login rejected: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let security = &state.config.security;
    let tokens = issue_tokens(&user, security)?;
    state
        .users
        .set_refresh_token_hash(user.id, Some(token_digest(&tokens.refresh_token)))
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    let jar = set_session_cookies(jar, &tokens, security.cookie_secure);
    let body = SessionResponse {
        user,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };
    Ok((jar, ApiResponse::success(body).with_message("User logged in successfully")))
}
