// handlers/protected/leads/query.rs - free-text and filtered lead search

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::Lead;
use crate::filter::FilterRequest;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct QuickQuery {
    pub q: Option<String>,
}

/// GET /api/v1/leads/query?q= - case-insensitive match on name, email, company or city
pub async fn quick_query(State(state): State<AppState>, Query(query): Query<QuickQuery>) -> ApiResult<Vec<Lead>> {
    let mut request = FilterRequest::new();
    if let Some(q) = query.q {
        request = request.with("search", q);
    }

    let filter = state.filter.build(&request)?;
    let leads = state.leads.find(&filter).await?;

    Ok(ApiResponse::success(leads).with_message("Search result"))
}

/// GET /api/v1/leads/allquery - structured filter, see `FilterBuilder`
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Lead>> {
    let filter = state.filter.build(&FilterRequest::from(params))?;
    tracing::debug!(conditions = filter.conditions().len(), limit = filter.limit(), "lead query");

    let leads = state.leads.find(&filter).await?;

    Ok(ApiResponse::success(leads).with_message("Filtered data"))
}
