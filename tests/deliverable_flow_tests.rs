//! Deliverable review workflow over HTTP

use hyper::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{create_account, create_project, send, setup_app};

async fn project(app: &axum::Router) -> String {
    let account = create_account(app, "Acme").await;
    create_project(app, &account, "Website").await
}

async fn create(app: &axum::Router, project: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/projects/{}/deliverables", project),
        Some(body),
    )
    .await
}

async fn act(app: &axum::Router, project: &str, id: &str, action: &str, body: Option<Value>) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/projects/{}/deliverables/{}/{}", project, id, action),
        body,
    )
    .await
}

#[tokio::test]
async fn test_submit_then_revise_then_approve() {
    let (app, _pool) = setup_app().await;
    let project = project(&app).await;

    let (status, deliverable) = create(
        &app,
        &project,
        json!({ "deliverable_number": 1, "version": "v1", "title": "Walkthrough", "type": "loom" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(deliverable["status"], "pending");
    assert_eq!(deliverable["type"], "loom");
    let id = deliverable["id"].as_str().unwrap();

    // cannot review before submission
    let (status, _) = act(&app, &project, id, "approve", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // submission needs a link
    let (status, _) = act(&app, &project, id, "submit", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = act(
        &app,
        &project,
        id,
        "submit",
        Some(json!({ "url": "https://loom.com/share/abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "submitted");

    let (status, _) = act(&app, &project, id, "request-revision", Some(json!({ "comment": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = act(
        &app,
        &project,
        id,
        "request-revision",
        Some(json!({ "comment": "Audio is too quiet" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "revision_requested");
    assert_eq!(body["client_comment"], "Audio is too quiet");

    // resubmission keeps the previous link
    let (status, body) = act(&app, &project, id, "submit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://loom.com/share/abc");

    let (status, body) = act(&app, &project, id, "approve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    let (status, _) = act(&app, &project, id, "request-revision", Some(json!({ "comment": "Too late" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_versions_follow_review() {
    let (app, _pool) = setup_app().await;
    let project = project(&app).await;

    let (status, v1) = create(
        &app,
        &project,
        json!({
            "deliverable_number": 2,
            "version": "v1",
            "title": "Spec",
            "type": "pdf",
            "url": "https://files.example.com/brief.pdf"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(v1["status"], "submitted");

    let v2 = json!({ "deliverable_number": 2, "version": "v2", "title": "Spec", "type": "pdf" });
    let (status, _) = create(&app, &project, v2.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = create(
        &app,
        &project,
        json!({ "deliverable_number": 2, "version": "v1", "title": "Again", "type": "pdf" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = v1["id"].as_str().unwrap();
    act(&app, &project, id, "request-revision", Some(json!({ "comment": "Missing pricing" }))).await;

    let (status, _) = create(&app, &project, v2).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = send(&app, "GET", &format!("/api/projects/{}/deliverables", project), None).await;
    assert_eq!(status, StatusCode::OK);
    let versions: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["version"].as_str().unwrap())
        .collect();
    assert_eq!(versions, vec!["v1", "v2"]);
}

#[tokio::test]
async fn test_deliverable_number_out_of_range() {
    let (app, _pool) = setup_app().await;
    let project = project(&app).await;

    let (status, _) = create(
        &app,
        &project,
        json!({ "deliverable_number": 4, "version": "v1", "title": "Extra", "type": "other" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create(
        &app,
        &project,
        json!({ "deliverable_number": 1, "version": "v4", "title": "Extra", "type": "other" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deliverables_for_missing_project() {
    let (app, _pool) = setup_app().await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(&app, "GET", &format!("/api/projects/{}/deliverables", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = create(
        &app,
        &missing.to_string(),
        json!({ "deliverable_number": 1, "version": "v1", "title": "Lost", "type": "json" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_deliverable() {
    let (app, _pool) = setup_app().await;
    let project = project(&app).await;
    let (_, deliverable) = create(
        &app,
        &project,
        json!({ "deliverable_number": 3, "version": "v1", "title": "Data", "type": "json" }),
    )
    .await;
    let uri = format!(
        "/api/projects/{}/deliverables/{}",
        project,
        deliverable["id"].as_str().unwrap()
    );

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
