// handlers/protected/auth/logout.rs - POST /api/v1/users/logout

use axum::{extract::State, Extension};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::public::auth::utils::clear_session_cookies;
use crate::middleware::{ApiResponse, AuthUser};

/// Revokes the stored refresh token and clears both session cookies
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    state.users.set_refresh_token_hash(auth_user.id, None).await?;

    tracing::info!(user_id = %auth_user.id, "User logged out");
    let jar = clear_session_cookies(jar, state.config.security.cookie_secure);
    Ok((jar, ApiResponse::success(json!({})).with_message("User logged out")))
}
