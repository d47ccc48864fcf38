//! Tasks

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::extract::ValidatedJson;
use crate::error::Result;
use crate::models::{CreateTaskRequest, Task, TaskFilter, UpdateTaskRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", patch(update_task).delete(delete_task))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.store.list_tasks(&filter).await?))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    Ok((StatusCode::CREATED, Json(state.store.create_task(request).await?)))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    Ok(Json(state.store.update_task(id, request).await?))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
