mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{lead, TestApp};

#[tokio::test]
async fn create_and_fetch_lead() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;

    let created = app.create_lead(&token, lead(1)).await?;
    assert_eq!(created["first_name"], "Lead1");
    assert_eq!(created["status"], "new");
    assert_eq!(created["score"], 0.0);
    assert_eq!(created["is_qualified"], false);

    let id = created["id"].as_str().unwrap_or_default();
    let res = app.get(&format!("/api/v1/leads/{}", id), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["email"], "lead1@example.com");
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicates_and_bad_input() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;
    app.create_lead(&token, lead(1)).await?;

    let mut same_email = lead(2);
    same_email["email"] = json!("lead1@example.com");
    let res = app.post("/api/v1/leads", same_email, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let mut missing = lead(3);
    if let Some(fields) = missing.as_object_mut() {
        fields.remove("status");
    }
    let res = app.post("/api/v1/leads", missing, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Missing fields");

    let mut bad_score = lead(4);
    bad_score["score"] = json!(150);
    let res = app.post("/api/v1/leads", bad_score, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_paginates_with_totals() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;
    for n in 0..5 {
        app.create_lead(&token, lead(n)).await?;
    }

    let res = app.get("/api/v1/leads?limit=2&page=2", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let page = &res.body["data"];
    assert_eq!(page["page"], 2);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["total"], 5);
    assert_eq!(page["totalPages"], 3);
    let names: Vec<_> = page["data"]
        .as_array()
        .map(|a| a.iter().filter_map(|l| l["first_name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Lead2", "Lead3"]);

    let defaults = app.get("/api/v1/leads?limit=abc", Some(&token)).await?;
    assert_eq!(defaults.body["data"]["limit"], 20);
    assert_eq!(defaults.body["data"]["page"], 1);
    Ok(())
}

#[tokio::test]
async fn list_rejects_oversized_pages() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;

    let res = app.get("/api/v1/leads?limit=101", Some(&token)).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Max limit is 100");
    Ok(())
}

#[tokio::test]
async fn update_applies_whitelisted_fields_only() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;
    let created = app.create_lead(&token, lead(1)).await?;
    let uri = format!("/api/v1/leads/{}", created["id"].as_str().unwrap_or_default());

    let res = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({ "status": "qualified", "score": 75, "email": "changed@example.com" })),
            Some(&token),
        )
        .await?;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["status"], "qualified");
    assert_eq!(res.body["data"]["score"], 75.0);
    assert_eq!(res.body["data"]["email"], "lead1@example.com");

    let invalid = app.send(Method::PUT, &uri, Some(json!({ "source": "tv" })), Some(&token)).await?;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_clears_nullable_fields_with_blank_values() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;
    let mut body = lead(2);
    body["city"] = json!("Lisbon");
    body["company"] = json!("Acme");
    let created = app.create_lead(&token, body).await?;
    let uri = format!("/api/v1/leads/{}", created["id"].as_str().unwrap_or_default());

    let res = app.send(Method::PUT, &uri, Some(json!({ "city": "" })), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert!(res.body["data"]["city"].is_null());
    assert_eq!(res.body["data"]["company"], "Acme");

    let fractional = app.send(Method::PUT, &uri, Some(json!({ "phone": 5550100.5 })), Some(&token)).await?;
    assert_eq!(fractional.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn missing_and_malformed_ids() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;
    let missing = format!("/api/v1/leads/{}", Uuid::new_v4());

    assert_eq!(app.get(&missing, Some(&token)).await?.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.send(Method::PUT, &missing, Some(json!({ "status": "won" })), Some(&token)).await?.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.send(Method::DELETE, &missing, None, Some(&token)).await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/v1/leads/not-a-uuid", Some(&token)).await?.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn delete_removes_lead() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;
    let created = app.create_lead(&token, lead(1)).await?;
    let uri = format!("/api/v1/leads/{}", created["id"].as_str().unwrap_or_default());

    let res = app.send(Method::DELETE, &uri, None, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);

    assert_eq!(app.get(&uri, Some(&token)).await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let token = app.access_token().await?;

    let mut big = lead(1);
    big["company"] = json!("x".repeat(20 * 1024));
    let res = app.post("/api/v1/leads", big, Some(&token)).await?;

    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}
