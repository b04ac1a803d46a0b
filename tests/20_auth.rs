mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use common::{TestApp, PASSWORD};

#[tokio::test]
async fn register_returns_user_without_secrets() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post(
            "/api/v1/users",
            json!({ "fullName": "Ada Lovelace", "email": "  Ada@Example.COM ", "password": PASSWORD }),
            None,
        )
        .await?;

    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let user = &res.body["data"];
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["full_name"], "Ada Lovelace");
    assert_eq!(user["role"], "user");
    assert!(user.get("password_hash").is_none());
    assert!(user.get("refresh_token_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn register_validates_input() -> Result<()> {
    let app = TestApp::new();

    let missing = app.post("/api/v1/users", json!({ "email": "a@b.co", "password": PASSWORD }), None).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let short = app
        .post("/api/v1/users", json!({ "fullName": "A", "email": "a@b.co", "password": "12345" }), None)
        .await?;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert!(short.body["field_errors"]["password"].is_string());

    let bad_email = app
        .post("/api/v1/users", json!({ "fullName": "A", "email": "not-an-email", "password": PASSWORD }), None)
        .await?;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn register_rejects_taken_email() -> Result<()> {
    let app = TestApp::new();

    app.register("taken@example.com").await?;
    let again = app.register("TAKEN@example.com").await?;

    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["message"], "Email is taken");
    Ok(())
}

#[tokio::test]
async fn register_rejects_malformed_json() -> Result<()> {
    let app = TestApp::new();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let res = app.request(req).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn login_sets_cookies_and_returns_tokens() -> Result<()> {
    let app = TestApp::new();
    app.register("login@example.com").await?;

    let res = app.login("login@example.com").await?;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let access = res.body["data"]["accessToken"].as_str().unwrap_or_default();
    let refresh = res.body["data"]["refreshToken"].as_str().unwrap_or_default();
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
    assert_eq!(res.cookie("accessToken").as_deref(), Some(access));
    assert_eq!(res.cookie("refreshToken").as_deref(), Some(refresh));
    assert!(res.cookies().iter().all(|c| c.contains("HttpOnly")));
    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let app = TestApp::new();
    app.register("known@example.com").await?;

    let wrong_password = app
        .post("/api/v1/users/login", json!({ "email": "known@example.com", "password": "wrong-pass" }), None)
        .await?;
    let unknown_email = app.login("unknown@example.com").await?;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["message"], unknown_email.body["message"]);
    assert_eq!(wrong_password.body["message"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> Result<()> {
    let app = TestApp::new();

    let anonymous = app.get("/api/v1/leads", None).await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let garbage = app.get("/api/v1/leads", Some("not.a.jwt")).await?;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let token = app.access_token().await?;
    let ok = app.get("/api/v1/leads", Some(&token)).await?;
    assert_eq!(ok.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn access_cookie_authenticates() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;

    let req = Request::builder()
        .uri("/api/v1/leads")
        .header(header::COOKIE, format!("accessToken={}", token))
        .body(Body::empty())?;
    let res = app.request(req).await?;

    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() -> Result<()> {
    let app = TestApp::new();
    app.register("rotate@example.com").await?;
    let login = app.login("rotate@example.com").await?;
    let first = login.body["data"]["refreshToken"].as_str().unwrap_or_default().to_string();

    let rotated = app.post("/api/v1/users/refresh", json!({ "refreshToken": first }), None).await?;
    assert_eq!(rotated.status, StatusCode::OK, "{}", rotated.body);
    let second = rotated.body["data"]["refreshToken"].as_str().unwrap_or_default().to_string();
    assert_ne!(first, second);
    assert!(rotated.cookie("accessToken").is_some());

    let reused = app.post("/api/v1/users/refresh", json!({ "refreshToken": first }), None).await?;
    assert_eq!(reused.status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/refresh")
        .header(header::COOKIE, format!("refreshToken={}", second))
        .body(Body::empty())?;
    let from_cookie = app.request(req).await?;
    assert_eq!(from_cookie.status, StatusCode::OK, "{}", from_cookie.body);
    Ok(())
}

#[tokio::test]
async fn refresh_without_token_is_unauthorized() -> Result<()> {
    let app = TestApp::new();

    let res = app.send(Method::POST, "/api/v1/users/refresh", None, None).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_revokes_refresh_token_and_clears_cookies() -> Result<()> {
    let app = TestApp::new();
    app.register("bye@example.com").await?;
    let login = app.login("bye@example.com").await?;
    let access = login.body["data"]["accessToken"].as_str().unwrap_or_default().to_string();
    let refresh = login.body["data"]["refreshToken"].as_str().unwrap_or_default().to_string();

    let res = app.send(Method::POST, "/api/v1/users/logout", None, Some(&access)).await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.cookie("accessToken").as_deref(), Some(""));
    assert_eq!(res.cookie("refreshToken").as_deref(), Some(""));

    let refreshed = app.post("/api/v1/users/refresh", json!({ "refreshToken": refresh }), None).await?;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
