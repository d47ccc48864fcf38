//! API integration tests

use hyper::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{create_account, create_project, send, setup_app, setup_pool};

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = setup_app().await;

    let response = app
        .oneshot(
            hyper::Request::builder()
                .uri("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), hyper::StatusCode::OK);
}

#[tokio::test]
async fn test_app_state_new() {
    let pool = setup_pool().await;
    let state = portal::AppState::new(pool);
    assert_eq!(state.mailer.provider(), "log");
    assert_eq!(state.invites.default_ttl_minutes, 10080);
}

#[tokio::test]
async fn test_account_crud() {
    let (app, _pool) = setup_app().await;
    let id = create_account(&app, "Acme").await;

    let (status, body) = send(&app, "GET", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/accounts/{}", id),
        Some(json!({ "industry": "Retail" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["industry"], "Retail");

    let (status, body) = send(&app, "GET", "/api/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_account_validation_errors() {
    let (app, _pool) = setup_app().await;

    let (status, body) = send(&app, "POST", "/api/accounts", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/accounts",
        Some(json!({ "name": "Acme", "website": "not a url" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/api/accounts", Some(json!({ "website": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_account_with_projects_cannot_be_deleted() {
    let (app, _pool) = setup_app().await;
    let account_id = create_account(&app, "Acme").await;
    create_project(&app, &account_id, "Website").await;

    let (status, _) = send(&app, "DELETE", &format!("/api/accounts/{}", account_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_contacts_filtered_by_account() {
    let (app, _pool) = setup_app().await;
    let acme = create_account(&app, "Acme").await;
    let globex = create_account(&app, "Globex").await;

    for (account, email) in [(&acme, "a@acme.com"), (&acme, "b@acme.com"), (&globex, "c@globex.com")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/contacts",
            Some(json!({ "account_id": account, "name": "Contact", "email": email })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", &format!("/api/contacts?account_id={}", acme), None).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 2);

    let id = contacts[0]["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/contacts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/api/contacts", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_vendors_and_contacts() {
    let (app, _pool) = setup_app().await;

    let (status, vendor) = send(
        &app,
        "POST",
        "/api/vendors",
        Some(json!({ "name": "Studio", "email": "hello@studio.io" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vendor_id = vendor["id"].as_str().unwrap();

    let (status, contact) = send(
        &app,
        "POST",
        &format!("/api/vendors/{}/contacts", vendor_id),
        Some(json!({ "name": "Riley", "email": "riley@studio.io" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(contact["vendor_id"], vendor_id);

    let (status, body) = send(&app, "GET", &format!("/api/vendors/{}/contacts", vendor_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/api/vendors/{}/contacts", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_projects_filter_and_update() {
    let (app, _pool) = setup_app().await;
    let acme = create_account(&app, "Acme").await;
    let globex = create_account(&app, "Globex").await;
    let website = create_project(&app, &acme, "Website").await;
    create_project(&app, &acme, "Brand").await;
    create_project(&app, &globex, "App").await;

    let (_, body) = send(&app, "GET", &format!("/api/projects?account_id={}", acme), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/projects/{}", website),
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (_, body) = send(&app, "GET", "/api/projects?status=active", None).await;
    let active = body.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], website.as_str());

    let (status, _) = send(&app, "DELETE", &format!("/api/projects/{}", website), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/projects/{}", website), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_for_missing_account() {
    let (app, _pool) = setup_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/projects",
        Some(json!({ "account_id": uuid::Uuid::new_v4(), "name": "Orphan" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let (app, _pool) = setup_app().await;
    let account = create_account(&app, "Acme").await;
    let project = create_project(&app, &account, "Website").await;
    let assignee = uuid::Uuid::new_v4();

    let (status, task) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({
            "project_id": project,
            "title": "Wireframes",
            "assignee_id": assignee,
            "due_date": "2026-11-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "todo");
    let task_id = task["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/tasks/{}", task_id),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "done");
    assert_eq!(body["due_date"], "2026-11-01");

    let (_, body) = send(&app, "GET", &format!("/api/tasks?assignee_id={}", assignee), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/tasks/{}", task_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", &format!("/api/tasks?project_id={}", project), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_users_empty_until_redeemed() {
    let (app, _pool) = setup_app().await;
    let (status, body) = send(&app, "GET", "/api/users?space=internal", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _pool) = setup_app().await;
    let (status, _) = send(&app, "GET", "/api/quotes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
