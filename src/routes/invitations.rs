//! Invitation management and magic-link redemption

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::extract::{OptionalJson, ValidatedJson};
use crate::error::Result;
use crate::invitation::service::{
    self, IssueInvitationRequest, IssuedInvitation, RedeemInvitationRequest, RedeemedInvitation,
    ResendInvitationRequest, RoleOption,
};
use crate::invitation::{InvitationPreview, InvitationView, Space};
use crate::store::InvitationFilter;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/invitations", get(list_invitations).post(issue_invitation))
        .route("/invitations/:id", delete(delete_invitation))
        .route("/invitations/:id/revoke", post(revoke_invitation))
        .route("/invitations/:id/resend", post(resend_invitation))
        .route("/invite/:token", get(preview_invitation))
        .route("/invite/:token/redeem", post(redeem_invitation))
        .route("/spaces/:space/roles", get(space_roles))
}

async fn list_invitations(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<InvitationFilter>,
) -> Result<Json<Vec<InvitationView>>> {
    let invitations = state.store.list_invitations(&filter).await?;
    Ok(Json(invitations.into_iter().map(InvitationView::from).collect()))
}

async fn issue_invitation(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<IssueInvitationRequest>,
) -> Result<(StatusCode, Json<IssuedInvitation>)> {
    let issued = service::issue(&state, request).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

async fn revoke_invitation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationView>> {
    let invitation = state.store.revoke_invitation(id).await?;
    Ok(Json(invitation.into()))
}

async fn resend_invitation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    OptionalJson(request): OptionalJson<ResendInvitationRequest>,
) -> Result<Json<IssuedInvitation>> {
    Ok(Json(service::resend(&state, id, request).await?))
}

async fn delete_invitation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_invitation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn preview_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<InvitationPreview>> {
    Ok(Json(service::preview(&state, &token).await?))
}

async fn redeem_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    OptionalJson(request): OptionalJson<RedeemInvitationRequest>,
) -> Result<Json<RedeemedInvitation>> {
    Ok(Json(service::redeem(&state, &token, request).await?))
}

async fn space_roles(Path(space): Path<Space>) -> Json<Vec<RoleOption>> {
    Json(service::role_options(space))
}
