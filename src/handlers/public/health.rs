// handlers/public/health.rs - service liveness endpoints

use axum::{
    extract::State,
    response::{Html, Json},
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - plain liveness page
pub async fn root() -> Html<&'static str> {
    Html("<!doctype html><html><head><title>lead-api</title></head><body><h1>SERVER UP!</h1></body></html>")
}

/// GET /api/v1/health - uptime and database status; always 200
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match state.leads.ping().await {
        Ok(()) => "ACTIVE",
        Err(e) => {
            tracing::warn!("Health check ping failed: {}", e);
            "INACTIVE"
        }
    };

    Json(json!({
        "status": "ok",
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "service": {
            "database": database
        },
        "timestamp": Utc::now()
    }))
}
