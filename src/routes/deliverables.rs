//! Project deliverables and their review workflow

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::extract::{OptionalJson, ValidatedJson};
use crate::deliverable::{
    CreateDeliverableRequest, ProjectDeliverable, RequestRevisionRequest, SubmitDeliverableRequest,
};
use crate::error::Result;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/projects/:id/deliverables",
            get(list_deliverables).post(create_deliverable),
        )
        .route(
            "/projects/:id/deliverables/:deliverable_id",
            delete(delete_deliverable),
        )
        .route(
            "/projects/:id/deliverables/:deliverable_id/submit",
            post(submit_deliverable),
        )
        .route(
            "/projects/:id/deliverables/:deliverable_id/approve",
            post(approve_deliverable),
        )
        .route(
            "/projects/:id/deliverables/:deliverable_id/request-revision",
            post(request_revision),
        )
}

async fn list_deliverables(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<ProjectDeliverable>>> {
    state.store.get_project(project_id).await?;
    Ok(Json(state.store.list_deliverables(project_id).await?))
}

async fn create_deliverable(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateDeliverableRequest>,
) -> Result<(StatusCode, Json<ProjectDeliverable>)> {
    let deliverable = state.store.create_deliverable(project_id, request).await?;
    Ok((StatusCode::CREATED, Json(deliverable)))
}

async fn submit_deliverable(
    State(state): State<Arc<AppState>>,
    Path((project_id, id)): Path<(Uuid, Uuid)>,
    OptionalJson(request): OptionalJson<SubmitDeliverableRequest>,
) -> Result<Json<ProjectDeliverable>> {
    let deliverable = state
        .store
        .submit_deliverable(project_id, id, request.url)
        .await?;
    Ok(Json(deliverable))
}

async fn approve_deliverable(
    State(state): State<Arc<AppState>>,
    Path((project_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectDeliverable>> {
    let deliverable = state.store.approve_deliverable(project_id, id).await?;
    Ok(Json(deliverable))
}

async fn request_revision(
    State(state): State<Arc<AppState>>,
    Path((project_id, id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<RequestRevisionRequest>,
) -> Result<Json<ProjectDeliverable>> {
    let deliverable = state
        .store
        .request_deliverable_revision(project_id, id, &request.comment)
        .await?;
    Ok(Json(deliverable))
}

async fn delete_deliverable(
    State(state): State<Arc<AppState>>,
    Path((project_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    state.store.delete_deliverable(project_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
