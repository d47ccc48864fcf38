//! HTTP routes

mod accounts;
mod deliverables;
pub mod extract;
mod gmail;
mod invitations;
mod projects;
mod tasks;
mod users;
mod vendors;

use axum::{
    extract::{MatchedPath, Request},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(invitations::routes())
        .merge(accounts::routes())
        .merge(vendors::routes())
        .merge(projects::routes())
        .merge(deliverables::routes())
        .merge(tasks::routes())
        .merge(users::routes())
        .merge(gmail::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Request span with the route template as `path`; magic-link tokens never reach the log
fn request_span(request: &Request) -> Span {
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => redact_invite_token(request.uri().path()),
    };
    tracing::debug_span!("request", method = %request.method(), path = %path)
}

/// Replace the segment after `invite` with `:token`
fn redact_invite_token(path: &str) -> String {
    let mut after_invite = false;
    path.split('/')
        .map(|segment| {
            if after_invite {
                after_invite = false;
                ":token"
            } else {
                after_invite = segment == "invite";
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
