//! Invitation records and their lifecycle
//!
//! Stored transitions are `pending -> accepted` and `pending -> revoked`.
//! Expiry is never stored by a transition; it is derived from `expires_at`
//! whenever an invitation is displayed or redeemed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::{Role, Space};

/// Stored status of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Revoked => "revoked",
        }
    }
}

impl std::str::FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "expired" => Ok(InvitationStatus::Expired),
            "revoked" => Ok(InvitationStatus::Revoked),
            _ => Err(format!("Invalid invitation status: {}", s)),
        }
    }
}

/// Optional records an invitation pre-links the future user to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationLinks {
    pub account_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub vendor_contact_id: Option<Uuid>,
}

impl InvitationLinks {
    /// Check the linkage makes sense for the space.
    ///
    /// Accounts only link client invitations; vendor records only link
    /// vendor invitations, and at most one of them.
    pub fn validate_for(&self, space: Space) -> Result<(), String> {
        let has_vendor_link = self.vendor_id.is_some() || self.vendor_contact_id.is_some();

        match space {
            Space::Internal => {
                if self.account_id.is_some() || has_vendor_link {
                    return Err("Internal invitations cannot link an account or vendor".to_string());
                }
            }
            Space::Client => {
                if has_vendor_link {
                    return Err("Client invitations cannot link a vendor".to_string());
                }
            }
            Space::Vendor => {
                if self.account_id.is_some() {
                    return Err("Vendor invitations cannot link an account".to_string());
                }
                if self.vendor_id.is_some() && self.vendor_contact_id.is_some() {
                    return Err(
                        "Link either a vendor or a vendor contact, not both".to_string(),
                    );
                }
            }
        }

        Ok(())
    }
}

/// Why a token could not be redeemed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemRejection {
    /// The stored status is no longer pending
    NotPending(InvitationStatus),
    /// The invitation is pending but past its expiry
    Expired,
}

impl std::fmt::Display for RedeemRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedeemRejection::NotPending(status) => {
                write!(f, "Invitation is already {}", status.as_str())
            }
            RedeemRejection::Expired => write!(f, "Invitation has expired"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub space: Space,
    pub status: InvitationStatus,
    /// SHA-256 hex digest of the magic-link token
    #[serde(skip)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(flatten)]
    pub links: InvitationLinks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Create a pending invitation expiring at `expires_at`
    pub fn new(
        email: impl Into<String>,
        role: Role,
        space: Space,
        links: InvitationLinks,
        token_hash: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            role,
            space,
            status: InvitationStatus::Pending,
            token_hash: token_hash.into(),
            expires_at,
            links,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Status shown to users: `expired` once past `expires_at`, whatever is stored
    pub fn display_status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.is_expired_at(now) {
            InvitationStatus::Expired
        } else {
            self.status
        }
    }

    pub fn display_status(&self) -> InvitationStatus {
        self.display_status_at(Utc::now())
    }

    /// Revoke offers are only made for pending invitations
    pub fn can_revoke(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Revoke the invitation.
    ///
    /// Returns `Ok(false)` when it was already revoked.
    pub fn revoke(&mut self) -> Result<bool, String> {
        match self.status {
            InvitationStatus::Pending => {
                self.status = InvitationStatus::Revoked;
                self.updated_at = Utc::now();
                Ok(true)
            }
            InvitationStatus::Revoked => Ok(false),
            other => Err(format!(
                "Cannot revoke invitation with status: {}",
                other.as_str()
            )),
        }
    }

    /// Replace the token and expiry; status is unchanged
    pub fn renew(
        &mut self,
        token_hash: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), String> {
        if self.status != InvitationStatus::Pending {
            return Err(format!(
                "Cannot resend invitation with status: {}",
                self.status.as_str()
            ));
        }
        self.token_hash = token_hash.into();
        self.expires_at = expires_at;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Consume the invitation at `now`
    pub fn accept_at(&mut self, now: DateTime<Utc>) -> Result<(), RedeemRejection> {
        if self.status != InvitationStatus::Pending {
            return Err(RedeemRejection::NotPending(self.status));
        }
        if self.is_expired_at(now) {
            return Err(RedeemRejection::Expired);
        }
        self.status = InvitationStatus::Accepted;
        self.updated_at = now;
        Ok(())
    }
}

/// An invitation as returned by the API, with its derived display state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub display_status: InvitationStatus,
    pub is_expired: bool,
    pub can_revoke: bool,
}

impl InvitationView {
    pub fn at(invitation: Invitation, now: DateTime<Utc>) -> Self {
        Self {
            display_status: invitation.display_status_at(now),
            is_expired: invitation.is_expired_at(now),
            can_revoke: invitation.can_revoke(),
            invitation,
        }
    }
}

impl From<Invitation> for InvitationView {
    fn from(invitation: Invitation) -> Self {
        Self::at(invitation, Utc::now())
    }
}

/// What an unauthenticated visitor of a magic link may see
#[derive(Debug, Clone, Serialize)]
pub struct InvitationPreview {
    pub email: String,
    pub role: Role,
    pub space: Space,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
}

impl From<&Invitation> for InvitationPreview {
    fn from(invitation: &Invitation) -> Self {
        Self {
            email: invitation.email.clone(),
            role: invitation.role,
            space: invitation.space,
            status: invitation.display_status(),
            expires_at: invitation.expires_at,
        }
    }
}
