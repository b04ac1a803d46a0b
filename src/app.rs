use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{LeadStore, UserStore};
use crate::filter::FilterBuilder;
use crate::handlers::{protected, public};
use crate::middleware::require_auth;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub leads: Arc<dyn LeadStore>,
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
    pub filter: FilterBuilder,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(leads: Arc<dyn LeadStore>, users: Arc<dyn UserStore>, config: AppConfig) -> Self {
        Self {
            leads,
            users,
            filter: FilterBuilder::from_config(&config.filter),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.api.cors_origins);

    let api = Router::new()
        .route("/health", get(public::health))
        .nest("/users", user_routes(state.clone()))
        .nest("/leads", lead_routes(state.clone()));

    Router::new()
        .route("/", get(public::root))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes(state: AppState) -> Router<AppState> {
    use protected::auth;

    let protected = Router::new()
        .route("/logout", post(auth::logout))
        .route_layer(from_fn_with_state(state, require_auth));

    Router::new()
        .route("/", post(public::auth::register))
        .route("/login", post(public::auth::login))
        .route("/refresh", post(public::auth::refresh))
        .merge(protected)
}

fn lead_routes(state: AppState) -> Router<AppState> {
    use protected::leads;

    Router::new()
        .route("/", get(leads::list).post(leads::create))
        .route("/query", get(leads::quick_query))
        .route("/allquery", get(leads::query))
        .route("/:id", get(leads::get).put(leads::update).delete(leads::delete))
        .route_layer(from_fn_with_state(state, require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    // Cookies need an explicit origin list; wildcards are rejected with credentials
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
