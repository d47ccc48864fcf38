//! Database store

mod accounts;
mod deliverables;
mod invitations;
mod projects;
mod tasks;
mod users;
mod vendors;

pub use invitations::InvitationFilter;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Database store
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// Row conversion helpers

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::Internal(format!("Invalid UUID: {}", e)))
}

fn parse_opt_uuid(value: Option<String>) -> Result<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

/// Report a unique constraint hit as a conflict; other errors pass through
fn conflict_on_unique(err: sqlx::Error, message: String) -> AppError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message),
        other => AppError::Database(other),
    }
}

fn parse_enum<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(AppError::Internal)
}
