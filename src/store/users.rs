//! Users provisioned through invitations

use chrono::Utc;
use uuid::Uuid;

use super::{parse_enum, parse_opt_uuid, parse_uuid, Store};
use crate::error::{AppError, Result};
use crate::models::{User, UserFilter};

impl Store {
    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role, space, account_id, vendor_id, vendor_contact_id, invitation_id, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let space = filter.space.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role, space, account_id, vendor_id, vendor_contact_id, invitation_id, created_at
            FROM users
            WHERE (? IS NULL OR space = ?)
            ORDER BY created_at ASC
            "#,
        )
        .bind(space)
        .bind(space)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: Option<String>,
    role: String,
    space: String,
    account_id: Option<String>,
    vendor_id: Option<String>,
    vendor_contact_id: Option<String>,
    invitation_id: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            email: row.email,
            name: row.name,
            role: parse_enum(&row.role)?,
            space: parse_enum(&row.space)?,
            account_id: parse_opt_uuid(row.account_id)?,
            vendor_id: parse_opt_uuid(row.vendor_id)?,
            vendor_contact_id: parse_opt_uuid(row.vendor_contact_id)?,
            invitation_id: parse_opt_uuid(row.invitation_id)?,
            created_at: row.created_at,
        })
    }
}
