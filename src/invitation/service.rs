//! Issuing, resending and redeeming invitations
//!
//! Ties the store, token generation and the mailer together. Handlers call
//! these functions; nothing here knows about HTTP.

use chrono::{Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::model::{Invitation, InvitationLinks, InvitationPreview, InvitationView};
use super::role::{Role, Space};
use super::token;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::AppState;

/// Longest lifetime an invitation may be given (30 days)
pub const MAX_EXPIRES_IN_MINUTES: i64 = 30 * 24 * 60;

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn normalized_email<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|raw| normalize_email(&raw))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IssueInvitationRequest {
    #[serde(deserialize_with = "normalized_email")]
    #[validate(email, length(max = 255))]
    pub email: String,
    pub role: Role,
    pub space: Space,
    #[validate(range(min = 1, max = 43200))]
    pub expires_in_minutes: Option<i64>,
    pub account_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub vendor_contact_id: Option<Uuid>,
    #[serde(default)]
    pub send_email: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ResendInvitationRequest {
    #[validate(range(min = 1, max = 43200))]
    pub expires_in_minutes: Option<i64>,
    #[serde(default)]
    pub send_email: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RedeemInvitationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
}

/// Result of issuing or resending: the link is only ever shown here
#[derive(Debug, Serialize)]
pub struct IssuedInvitation {
    pub invitation: InvitationView,
    pub link: String,
    pub email_sent: bool,
}

#[derive(Debug, Serialize)]
pub struct RedeemedInvitation {
    pub invitation: InvitationView,
    pub user: User,
}

/// Roles offered when inviting into `space`
#[derive(Debug, Serialize)]
pub struct RoleOption {
    pub role: Role,
    pub label: &'static str,
}

pub fn role_options(space: Space) -> Vec<RoleOption> {
    space
        .roles()
        .iter()
        .map(|role| RoleOption {
            role: *role,
            label: role.label(),
        })
        .collect()
}

fn expiry_minutes(requested: Option<i64>, state: &AppState) -> Result<i64> {
    let minutes = requested.unwrap_or(state.invites.default_ttl_minutes);
    if !(1..=MAX_EXPIRES_IN_MINUTES).contains(&minutes) {
        return Err(AppError::BadRequest(format!(
            "expires_in_minutes must be between 1 and {}",
            MAX_EXPIRES_IN_MINUTES
        )));
    }
    Ok(minutes)
}

/// Make sure every linked record exists
async fn check_links_exist(state: &AppState, links: &InvitationLinks) -> Result<()> {
    if let Some(account_id) = links.account_id {
        state.store.get_account(account_id).await?;
    }
    if let Some(vendor_id) = links.vendor_id {
        state.store.get_vendor(vendor_id).await?;
    }
    if let Some(vendor_contact_id) = links.vendor_contact_id {
        state.store.get_vendor_contact(vendor_contact_id).await?;
    }
    Ok(())
}

/// Email the link; failures are logged and reported, never fatal
async fn dispatch(state: &AppState, invitation: &Invitation, link: &str) -> bool {
    match state
        .mailer
        .send_invitation(&invitation.email, invitation.role, link, invitation.expires_at)
        .await
    {
        Ok(()) => {
            tracing::info!(invitation_id = %invitation.id, "Invitation email sent");
            true
        }
        Err(e) => {
            tracing::warn!(invitation_id = %invitation.id, "Invitation email failed: {}", e);
            false
        }
    }
}

pub async fn issue(state: &AppState, mut request: IssueInvitationRequest) -> Result<IssuedInvitation> {
    request.email = normalize_email(&request.email);
    request.validate()?;

    if !request.role.is_allowed_in(request.space) {
        return Err(AppError::BadRequest(format!(
            "Role {} is not available in the {} space",
            request.role, request.space
        )));
    }

    let links = InvitationLinks {
        account_id: request.account_id,
        vendor_id: request.vendor_id,
        vendor_contact_id: request.vendor_contact_id,
    };
    links
        .validate_for(request.space)
        .map_err(AppError::BadRequest)?;
    check_links_exist(state, &links).await?;

    let minutes = expiry_minutes(request.expires_in_minutes, state)?;
    let issued = token::generate();
    let invitation = Invitation::new(
        request.email,
        request.role,
        request.space,
        links,
        issued.hash,
        Utc::now() + Duration::minutes(minutes),
    );

    state.store.insert_invitation(&invitation).await?;
    tracing::info!(
        invitation_id = %invitation.id,
        role = invitation.role.as_str(),
        space = invitation.space.as_str(),
        "Invitation issued"
    );

    let link = token::magic_link(&state.invites.public_base_url, &issued.token);
    let email_sent = if request.send_email {
        dispatch(state, &invitation, &link).await
    } else {
        false
    };

    Ok(IssuedInvitation {
        invitation: invitation.into(),
        link,
        email_sent,
    })
}

/// Regenerate token and expiry of a pending invitation
pub async fn resend(
    state: &AppState,
    id: Uuid,
    request: ResendInvitationRequest,
) -> Result<IssuedInvitation> {
    request.validate()?;

    let minutes = expiry_minutes(request.expires_in_minutes, state)?;
    let issued = token::generate();
    let invitation = state
        .store
        .renew_invitation(id, &issued.hash, Utc::now() + Duration::minutes(minutes))
        .await?;

    let link = token::magic_link(&state.invites.public_base_url, &issued.token);
    let email_sent = if request.send_email {
        dispatch(state, &invitation, &link).await
    } else {
        false
    };

    Ok(IssuedInvitation {
        invitation: invitation.into(),
        link,
        email_sent,
    })
}

/// What the magic-link landing page shows before redemption
pub async fn preview(state: &AppState, raw_token: &str) -> Result<InvitationPreview> {
    let invitation = state
        .store
        .find_invitation_by_token_hash(&token::hash(raw_token))
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

    Ok(InvitationPreview::from(&invitation))
}

pub async fn redeem(
    state: &AppState,
    raw_token: &str,
    request: RedeemInvitationRequest,
) -> Result<RedeemedInvitation> {
    request.validate()?;

    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let (invitation, user) = state
        .store
        .redeem_invitation(&token::hash(raw_token), name, Utc::now())
        .await?;

    Ok(RedeemedInvitation {
        invitation: invitation.into(),
        user,
    })
}
