//! Vendors and vendor contacts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::extract::ValidatedJson;
use crate::error::Result;
use crate::models::{CreateVendorContactRequest, CreateVendorRequest, Vendor, VendorContact};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vendors", get(list_vendors).post(create_vendor))
        .route(
            "/vendors/:id/contacts",
            get(list_vendor_contacts).post(create_vendor_contact),
        )
}

async fn list_vendors(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Vendor>>> {
    Ok(Json(state.store.list_vendors().await?))
}

async fn create_vendor(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVendorRequest>,
) -> Result<(StatusCode, Json<Vendor>)> {
    let vendor = state.store.create_vendor(request).await?;
    tracing::info!(vendor_id = %vendor.id, "Vendor created");
    Ok((StatusCode::CREATED, Json(vendor)))
}

async fn list_vendor_contacts(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<Uuid>,
) -> Result<Json<Vec<VendorContact>>> {
    state.store.get_vendor(vendor_id).await?;
    Ok(Json(state.store.list_vendor_contacts(vendor_id).await?))
}

async fn create_vendor_contact(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateVendorContactRequest>,
) -> Result<(StatusCode, Json<VendorContact>)> {
    let contact = state.store.create_vendor_contact(vendor_id, request).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}
