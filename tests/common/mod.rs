#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use lead_api::config::{AppConfig, StoreBackend};
use lead_api::database::MemoryStore;
use lead_api::{router, AppState};

pub const PASSWORD: &str = "secret123";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Every `Set-Cookie` header value
    pub fn cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.cookies()
            .iter()
            .find_map(|c| c.strip_prefix(&prefix).map(|rest| rest.split(';').next().unwrap_or("").to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.store = StoreBackend::Memory;
    config.security.bcrypt_cost = 4;
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), store, config);
        Self { router: router(state) }
    }

    pub async fn request(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse { status, headers, body })
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.request(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(body), token).await
    }

    pub async fn register(&self, email: &str) -> Result<TestResponse> {
        self.post(
            "/api/v1/users",
            json!({ "fullName": "Test User", "email": email, "password": PASSWORD }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str) -> Result<TestResponse> {
        self.post("/api/v1/users/login", json!({ "email": email, "password": PASSWORD }), None)
            .await
    }

    /// Registers a fresh user and returns its access token
    pub async fn access_token(&self) -> Result<String> {
        let email = "agent@example.com";
        self.register(email).await?;
        let res = self.login(email).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {}", res.body);
        res.body["data"]["accessToken"]
            .as_str()
            .map(str::to_string)
            .context("login response has no accessToken")
    }

    pub async fn create_lead(&self, token: &str, lead: Value) -> Result<Value> {
        let res = self.post("/api/v1/leads", lead, Some(token)).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create failed: {} {}", res.status, res.body);
        Ok(res.body["data"].clone())
    }
}

pub fn lead(n: u32) -> Value {
    json!({
        "firstName": format!("Lead{}", n),
        "lastName": "Example",
        "email": format!("lead{}@example.com", n),
        "phone": format!("555{:04}", n),
        "source": "website",
        "status": "new"
    })
}
