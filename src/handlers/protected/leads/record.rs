// handlers/protected/leads/record.rs - GET, PUT, DELETE /api/v1/leads/:id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use super::utils::{parse_id, UpdateLeadRequest};
use crate::app::AppState;
use crate::database::models::Lead;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

fn not_found(id: &uuid::Uuid) -> ApiError {
    ApiError::not_found(format!("Lead {} not found", id))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Lead> {
    let id = parse_id(&id)?;
    let lead = state.leads.get(id).await?.ok_or_else(|| not_found(&id))?;

    Ok(ApiResponse::success(lead).with_message(format!("Lead data for {}", id)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateLeadRequest>, JsonRejection>,
) -> ApiResult<Lead> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;

    let changes = payload.validate()?;
    if changes.is_empty() {
        return Err(ApiError::bad_request("No updatable fields supplied"));
    }

    let lead = state.leads.update(id, changes).await?.ok_or_else(|| not_found(&id))?;

    tracing::info!(lead_id = %lead.id, "Lead updated");
    Ok(ApiResponse::success(lead).with_message("Lead updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    if !state.leads.delete(id).await? {
        return Err(not_found(&id));
    }

    tracing::info!(lead_id = %id, "Lead deleted");
    Ok(ApiResponse::success(json!({ "id": id })).with_message(format!("Lead deleted where id={}", id)))
}
