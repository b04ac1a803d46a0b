// handlers/public/auth/refresh.rs - POST /api/v1/users/refresh

use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;

use super::utils::{set_session_cookies, RefreshRequest, SessionResponse};
use crate::app::AppState;
use crate::auth::{issue_tokens, token_digest, verify_refresh_token, REFRESH_COOKIE};
use crate::error::ApiError;
use crate::middleware::ApiResponse;

/// Exchanges a valid refresh token for a new pair. The presented token must
/// match the digest stored at its issue, so each refresh token works once.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, ApiResponse<SessionResponse>), ApiError> {
    let from_body = payload.and_then(|Json(p)| p.refresh_token).filter(|t| !t.is_empty());
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or(from_body)
        .ok_or_else(|| ApiError::unauthorized("Refresh token is required"))?;

    let security = &state.config.security;
    let claims = verify_refresh_token(&token, security)?;

    let user = state
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    if user.refresh_token_hash.as_deref() != Some(token_digest(&token).as_str()) {
        tracing::warn!(user_id = %user.id, "Refresh token reuse or revoked token");
        return Err(ApiError::unauthorized("Refresh token is expired or used"));
    }

    let tokens = issue_tokens(&user, security)?;
    state
        .users
        .set_refresh_token_hash(user.id, Some(token_digest(&tokens.refresh_token)))
        .await?;

    let jar = set_session_cookies(jar, &tokens, security.cookie_secure);
    let body = SessionResponse {
        user,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };
    Ok((jar, ApiResponse::success(body).with_message("Access token refreshed")))
}
