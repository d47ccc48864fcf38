//! Outbound mail integration status

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::mailer::MailerStatus;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/gmail/status", get(status))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<MailerStatus> {
    Json(state.mailer.status().await)
}
