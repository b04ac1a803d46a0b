// handlers/protected/leads/create.rs - POST /api/v1/leads

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::utils::CreateLeadRequest;
use crate::app::AppState;
use crate::database::models::Lead;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const DUPLICATE_LEAD: &str = "Lead with this email or phone already exists";

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateLeadRequest>, JsonRejection>,
) -> ApiResult<Lead> {
    let Json(payload) = payload?;
    let new_lead = payload.validate()?;

    if state
        .leads
        .find_by_email_or_phone(&new_lead.email, &new_lead.phone)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(DUPLICATE_LEAD));
    }

    // The unique indexes still catch a concurrent insert between check and write
    let lead = state.leads.create(new_lead).await?;

    tracing::info!(lead_id = %lead.id, "Lead created");
    Ok(ApiResponse::created(lead).with_message("Lead added"))
}
