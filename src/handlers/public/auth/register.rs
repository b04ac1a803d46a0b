// handlers/public/auth/register.rs - POST /api/v1/users

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::utils::{hash_password, is_valid_email, normalize_email, required, RegisterRequest, MIN_PASSWORD_LEN};
use crate::app::AppState;
use crate::database::models::{NewUser, User, UserRole};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Creates an account. The email is stored lowercased; a taken email is 409.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(payload) = payload?;

    let full_name = required(&payload.full_name, "fullName")?;
    let email = normalize_email(required(&payload.email, "email")?);
    let password = required(&payload.password, "password")?;

    if !is_valid_email(&email) {
        return Err(ApiError::field_error("email", "Please fill a valid email address"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::field_error(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email is taken"));
    }

    let password_hash = hash_password(password.to_string(), state.config.security.bcrypt_cost).await?;
    let user = state
        .users
        .create(NewUser {
            full_name: full_name.to_string(),
            email,
            password_hash,
            role: UserRole::User,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(ApiResponse::created(user).with_message("User registered successfully"))
}
