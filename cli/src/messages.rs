//! JSON types for the portal REST API
//!
//! These mirror the server's response bodies. Fields the CLI never prints
//! are kept so the types stay close to the server's.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Revoked => "revoked",
        };
        f.write_str(s)
    }
}

/// An invitation as listed by the server, including its display state
#[derive(Debug, Clone, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub space: String,
    pub status: InvitationStatus,
    pub display_status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub can_revoke: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuedInvitation {
    pub invitation: Invitation,
    pub link: String,
    pub email_sent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub space: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedeemedInvitation {
    pub invitation: Invitation,
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueInvitation {
    pub email: String,
    pub role: String,
    pub space: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_contact_id: Option<Uuid>,
    pub send_email: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResendInvitation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_minutes: Option<i64>,
    pub send_email: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    Pending,
    Submitted,
    Approved,
    RevisionRequested,
}

impl std::fmt::Display for DeliverableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliverableStatus::Pending => "pending",
            DeliverableStatus::Submitted => "submitted",
            DeliverableStatus::Approved => "approved",
            DeliverableStatus::RevisionRequested => "revision_requested",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deliverable {
    pub id: Uuid,
    pub project_id: Uuid,
    pub deliverable_number: u8,
    pub version: String,
    pub title: String,
    #[serde(rename = "type")]
    pub deliverable_type: String,
    pub url: Option<String>,
    pub status: DeliverableStatus,
    pub client_comment: Option<String>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
