//! Client accounts and their contacts

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::extract::ValidatedJson;
use crate::error::Result;
use crate::models::{
    Account, Contact, ContactFilter, CreateAccountRequest, CreateContactRequest,
    UpdateAccountRequest,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:id",
            get(get_account).patch(update_account).delete(delete_account),
        )
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/:id", delete(delete_contact))
}

async fn list_accounts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Account>>> {
    Ok(Json(state.store.list_accounts().await?))
}

async fn create_account(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let account = state.store.create_account(request).await?;
    tracing::info!(account_id = %account.id, "Account created");
    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>> {
    Ok(Json(state.store.get_account(id).await?))
}

async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateAccountRequest>,
) -> Result<Json<Account>> {
    Ok(Json(state.store.update_account(id, request).await?))
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_account(id).await?;
    tracing::info!(account_id = %id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<Contact>>> {
    Ok(Json(state.store.list_contacts(&filter).await?))
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>)> {
    Ok((StatusCode::CREATED, Json(state.store.create_contact(request).await?)))
}

async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_contact(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
