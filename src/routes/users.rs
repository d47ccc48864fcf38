//! Users provisioned by redeemed invitations

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{User, UserFilter};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/users", get(list_users))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.store.list_users(&filter).await?))
}
