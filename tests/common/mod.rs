//! Shared helpers for integration tests
#![allow(dead_code)]

use axum::body::Body;
use axum::Router;
use hyper::{Request, StatusCode};
use portal::config::InviteSettings;
use portal::mailer::Mailer;
use portal::AppState;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const BASE_URL: &str = "https://portal.test";

pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn setup_app_with_mailer(mailer: Mailer) -> (Router, SqlitePool) {
    let pool = setup_pool().await;
    let state = AppState::with_mailer(
        pool.clone(),
        mailer,
        InviteSettings {
            public_base_url: BASE_URL.to_string(),
            default_ttl_minutes: 10080,
        },
    );
    (portal::app(state), pool)
}

pub async fn setup_app() -> (Router, SqlitePool) {
    setup_app_with_mailer(Mailer::log("portal@test")).await
}

/// Send a request and decode the JSON response, `Value::Null` when empty
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn create_account(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/accounts",
        Some(serde_json::json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

pub async fn create_project(app: &Router, account_id: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/projects",
        Some(serde_json::json!({ "account_id": account_id, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Token part of a magic link
pub fn token_of(link: &str) -> String {
    link.rsplit('/').next().unwrap().to_string()
}
