// handlers/protected/leads/list.rs - GET /api/v1/leads

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::{models::Lead, Page};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPage {
    pub data: Vec<Lead>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// Positive integer, or `None` for anything absent, malformed or below 1
fn positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n >= 1)
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<LeadPage> {
    let pagination = &state.config.pagination;

    let limit = positive(query.limit.as_deref()).unwrap_or(i64::from(pagination.default_page_size));
    if limit > i64::from(pagination.max_page_size) {
        return Err(ApiError::bad_request(format!("Max limit is {}", pagination.max_page_size)));
    }
    let limit = limit as u32;
    let page = positive(query.page.as_deref())
        .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
        .unwrap_or(1);

    let data = state.leads.list(Page::new(page, limit)).await?;
    let total = state.leads.count().await?;
    let total_pages = (total + i64::from(limit) - 1) / i64::from(limit);

    Ok(ApiResponse::success(LeadPage {
        data,
        page,
        limit,
        total,
        total_pages,
    })
    .with_message("All Leads data"))
}
