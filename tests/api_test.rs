mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use mini_ledger::api::{AppServices, build_app};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app() -> Result<(Router, TempDir)> {
    let (t, temp) = common::test_ledger().await?;
    let services = Arc::new(AppServices::new(t.db.clone()));
    Ok((build_app(services, Duration::from_secs(10)), temp))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

async fn create_checking(app: &Router) -> Result<String> {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/accounts",
        Some(json!({ "name": "Checking", "type": "checking", "currency": "USD" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_health_and_readiness() -> Result<()> {
    let (app, _temp) = test_app().await?;

    let (status, body) = send(&app, Method::GET, "/healthz", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/readyz", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    Ok(())
}

#[tokio::test]
async fn test_account_endpoints() -> Result<()> {
    let (app, _temp) = test_app().await?;

    let (status, created) = send(
        &app,
        Method::POST,
        "/v1/accounts",
        Some(json!({ "name": "Checking", "type": "checking", "currency": "USD" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Checking");
    assert_eq!(created["type"], "checking");
    assert_eq!(created["currency"], "USD");
    assert!(created["created_at"].is_string());
    assert!(created["updated_at"].is_string());
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = send(&app, Method::GET, &format!("/v1/accounts/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, renamed) = send(
        &app,
        Method::PATCH,
        &format!("/v1/accounts/{id}"),
        Some(json!({ "name": "Everyday" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Everyday");

    let (status, listed) = send(&app, Method::GET, "/v1/accounts?limit=abc", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/v1/accounts/{id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/v1/accounts/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    Ok(())
}

#[tokio::test]
async fn test_account_validation_errors() -> Result<()> {
    let (app, _temp) = test_app().await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/accounts",
        Some(json!({ "name": "Checking", "type": "checking", "currency": "EUR" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/accounts",
        Some(json!({ "name": "Checking" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");

    Ok(())
}

#[tokio::test]
async fn test_ledger_endpoints() -> Result<()> {
    let (app, _temp) = test_app().await?;
    let id = create_checking(&app).await?;

    let (status, entry) = send(
        &app,
        Method::POST,
        &format!("/v1/accounts/{id}/entries"),
        Some(json!({
            "direction": "credit",
            "amount": "100.00",
            "category": "salary",
            "occurred_at": "2024-01-15T09:30:00Z"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["account_id"], id.as_str());
    assert_eq!(entry["amount"], "100.00");
    assert_eq!(entry["category"], "salary");
    assert!(entry["created_at"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/v1/accounts/{id}/entries"),
        Some(json!({ "direction": "debit", "amount": "40.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, balance) = send(&app, Method::GET, &format!("/v1/accounts/{id}/balance"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["account_id"], id.as_str());
    assert_eq!(balance["balance"], "60.00");

    let (status, listed) = send(&app, Method::GET, &format!("/v1/accounts/{id}/entries?limit=10"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let items = listed["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // The debit defaulted to now, so it sorts before the January credit
    assert_eq!(items[0]["direction"], "debit");
    assert_eq!(items[1], entry);

    let (status, body) = send(&app, Method::DELETE, &format!("/v1/accounts/{id}"), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    Ok(())
}

#[tokio::test]
async fn test_ledger_error_mapping() -> Result<()> {
    let (app, _temp) = test_app().await?;
    let id = create_checking(&app).await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/accounts/does-not-exist/entries",
        Some(json!({ "direction": "credit", "amount": "10.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/v1/accounts/{id}/entries"),
        Some(json!({ "direction": "credit", "amount": "0.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_entry");

    let (status, _) = send(&app, Method::GET, "/v1/accounts/does-not-exist/balance", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_balance_overflow_answers_500() -> Result<()> {
    let (app, _temp) = test_app().await?;
    let id = create_checking(&app).await?;

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/v1/accounts/{id}/entries"),
            Some(json!({ "direction": "credit", "amount": "79228162514264337593543950335" })),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, &format!("/v1/accounts/{id}/balance"), None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal");

    Ok(())
}
