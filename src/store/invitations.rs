//! Invitations and redemption
//!
//! Lifecycle updates are conditional on `status = 'pending'` so two racing
//! requests cannot both revoke, renew or redeem the same invitation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{conflict_on_unique, parse_enum, parse_opt_uuid, parse_uuid, Store};
use crate::error::{AppError, Result};
use crate::invitation::{
    Invitation, InvitationLinks, InvitationStatus, RedeemRejection, Space,
};
use crate::models::User;

/// Query filters for listing invitations
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InvitationFilter {
    pub space: Option<Space>,
    /// Matched against the display status, so `expired` finds lapsed pending rows
    pub status: Option<InvitationStatus>,
}

impl Store {
    pub async fn insert_invitation(&self, invitation: &Invitation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invitations (id, email, role, space, status, token_hash, expires_at, account_id, vendor_id, vendor_contact_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(invitation.id.to_string())
        .bind(&invitation.email)
        .bind(invitation.role.as_str())
        .bind(invitation.space.as_str())
        .bind(invitation.status.as_str())
        .bind(&invitation.token_hash)
        .bind(invitation.expires_at)
        .bind(invitation.links.account_id.map(|u| u.to_string()))
        .bind(invitation.links.vendor_id.map(|u| u.to_string()))
        .bind(invitation.links.vendor_contact_id.map(|u| u.to_string()))
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_invitation(&self, id: Uuid) -> Result<Invitation> {
        let row = sqlx::query_as::<_, InvitationRow>(
            r#"
            SELECT id, email, role, space, status, token_hash, expires_at, account_id, vendor_id, vendor_contact_id, created_at, updated_at
            FROM invitations
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invitation {} not found", id)))?;

        row.try_into()
    }

    pub async fn find_invitation_by_token_hash(&self, token_hash: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(
            r#"
            SELECT id, email, role, space, status, token_hash, expires_at, account_id, vendor_id, vendor_contact_id, created_at, updated_at
            FROM invitations
            WHERE token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    /// List invitations, newest first
    pub async fn list_invitations(&self, filter: &InvitationFilter) -> Result<Vec<Invitation>> {
        let space = filter.space.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, InvitationRow>(
            r#"
            SELECT id, email, role, space, status, token_hash, expires_at, account_id, vendor_id, vendor_contact_id, created_at, updated_at
            FROM invitations
            WHERE (? IS NULL OR space = ?)
            ORDER BY created_at DESC
            "#,
        )
        .bind(space)
        .bind(space)
        .fetch_all(&self.pool)
        .await?;

        let invitations = rows
            .into_iter()
            .map(|r| r.try_into())
            .collect::<Result<Vec<Invitation>>>()?;

        let now = Utc::now();
        Ok(match filter.status {
            Some(status) => invitations
                .into_iter()
                .filter(|i| i.display_status_at(now) == status)
                .collect(),
            None => invitations,
        })
    }

    /// Revoke a pending invitation; revoking twice is a no-op
    pub async fn revoke_invitation(&self, id: Uuid) -> Result<Invitation> {
        let mut invitation = self.get_invitation(id).await?;
        let changed = invitation.revoke().map_err(AppError::Conflict)?;

        if changed {
            let result = sqlx::query(
                r#"
                UPDATE invitations SET status = ?, updated_at = ?
                WHERE id = ? AND status = 'pending'
                "#,
            )
            .bind(InvitationStatus::Revoked.as_str())
            .bind(invitation.updated_at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                // Another request got there first; revoking twice is still a success
                let current = self.get_invitation(id).await?;
                if current.status == InvitationStatus::Revoked {
                    return Ok(current);
                }
                return Err(AppError::Conflict(format!(
                    "Invitation {} is no longer pending",
                    id
                )));
            }

            tracing::info!(invitation_id = %id, "Invitation revoked");
        }

        Ok(invitation)
    }

    /// Swap in a new token digest and expiry for a pending invitation
    pub async fn renew_invitation(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation> {
        let mut invitation = self.get_invitation(id).await?;
        invitation
            .renew(token_hash, expires_at)
            .map_err(AppError::Conflict)?;

        let result = sqlx::query(
            r#"
            UPDATE invitations SET token_hash = ?, expires_at = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(invitation.updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Invitation {} is no longer pending",
                id
            )));
        }

        tracing::info!(invitation_id = %id, %expires_at, "Invitation token renewed");
        Ok(invitation)
    }

    pub async fn delete_invitation(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Invitation {} not found", id)));
        }

        tracing::info!(invitation_id = %id, "Invitation deleted");
        Ok(())
    }

    /// Consume the invitation behind `token_hash` and provision its user
    ///
    /// The guarded update is the first statement, so the transaction holds the
    /// write lock before it reads. A concurrent loser sees zero affected rows.
    pub async fn redeem_invitation(
        &self,
        token_hash: &str,
        name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(Invitation, User)> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invitations SET status = ?, updated_at = ?
            WHERE token_hash = ? AND status = 'pending'
            "#,
        )
        .bind(InvitationStatus::Accepted.as_str())
        .bind(now)
        .bind(token_hash)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, InvitationRow>(
            r#"
            SELECT id, email, role, space, status, token_hash, expires_at, account_id, vendor_id, vendor_contact_id, created_at, updated_at
            FROM invitations
            WHERE token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;
        let mut invitation: Invitation = row.try_into()?;

        if result.rows_affected() == 0 {
            return Err(match invitation.accept_at(now) {
                Err(RedeemRejection::Expired) => AppError::Gone(RedeemRejection::Expired.to_string()),
                Err(rejection) => AppError::Conflict(rejection.to_string()),
                Ok(()) => AppError::Conflict("Invitation was already used".to_string()),
            });
        }

        // Dropping the transaction rolls the status back to pending
        if invitation.is_expired_at(now) {
            return Err(AppError::Gone(RedeemRejection::Expired.to_string()));
        }

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(&invitation.email)
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Err(AppError::Conflict(format!(
                "A user with email {} already exists",
                invitation.email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: invitation.email.clone(),
            name,
            role: invitation.role,
            space: invitation.space,
            account_id: invitation.links.account_id,
            vendor_id: invitation.links.vendor_id,
            vendor_contact_id: invitation.links.vendor_contact_id,
            invitation_id: Some(invitation.id),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, space, account_id, vendor_id, vendor_contact_id, invitation_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.space.as_str())
        .bind(user.account_id.map(|u| u.to_string()))
        .bind(user.vendor_id.map(|u| u.to_string()))
        .bind(user.vendor_contact_id.map(|u| u.to_string()))
        .bind(invitation.id.to_string())
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            conflict_on_unique(e, format!("A user with email {} already exists", user.email))
        })?;

        tx.commit().await?;

        tracing::info!(invitation_id = %invitation.id, user_id = %user.id, "Invitation redeemed");
        Ok((invitation, user))
    }
}

#[derive(sqlx::FromRow)]
struct InvitationRow {
    id: String,
    email: String,
    role: String,
    space: String,
    status: String,
    token_hash: String,
    expires_at: chrono::DateTime<Utc>,
    account_id: Option<String>,
    vendor_id: Option<String>,
    vendor_contact_id: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = AppError;

    fn try_from(row: InvitationRow) -> Result<Self> {
        Ok(Invitation {
            id: parse_uuid(&row.id)?,
            email: row.email,
            role: parse_enum(&row.role)?,
            space: parse_enum(&row.space)?,
            status: parse_enum(&row.status)?,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            links: InvitationLinks {
                account_id: parse_opt_uuid(row.account_id)?,
                vendor_id: parse_opt_uuid(row.vendor_id)?,
                vendor_contact_id: parse_opt_uuid(row.vendor_contact_id)?,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
