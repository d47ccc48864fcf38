//! Projects

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{parse_enum, parse_opt_uuid, parse_uuid, Store};
use crate::error::{AppError, Result};
use crate::models::{
    CreateProjectRequest, Project, ProjectFilter, ProjectStatus, UpdateProjectRequest,
};

impl Store {
    pub async fn create_project(&self, request: CreateProjectRequest) -> Result<Project> {
        self.get_account(request.account_id).await?;
        if let Some(vendor_id) = request.vendor_id {
            self.get_vendor(vendor_id).await?;
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = request.status.unwrap_or(ProjectStatus::Planning);

        sqlx::query(
            r#"
            INSERT INTO projects (id, account_id, name, description, status, vendor_id, start_date, due_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(request.account_id.to_string())
        .bind(&request.name)
        .bind(&request.description)
        .bind(status.as_str())
        .bind(request.vendor_id.map(|u| u.to_string()))
        .bind(request.start_date)
        .bind(request.due_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Project {
            id,
            account_id: request.account_id,
            name: request.name,
            description: request.description,
            status,
            vendor_id: request.vendor_id,
            start_date: request.start_date,
            due_date: request.due_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, account_id, name, description, status, vendor_id, start_date, due_date, created_at, updated_at
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let account_id = filter.account_id.map(|u| u.to_string());
        let vendor_id = filter.vendor_id.map(|u| u.to_string());
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, account_id, name, description, status, vendor_id, start_date, due_date, created_at, updated_at
            FROM projects
            WHERE (? IS NULL OR account_id = ?)
              AND (? IS NULL OR vendor_id = ?)
              AND (? IS NULL OR status = ?)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(&account_id)
        .bind(&account_id)
        .bind(&vendor_id)
        .bind(&vendor_id)
        .bind(status)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn update_project(&self, id: Uuid, request: UpdateProjectRequest) -> Result<Project> {
        if let Some(vendor_id) = request.vendor_id {
            self.get_vendor(vendor_id).await?;
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                status = COALESCE(?, status),
                vendor_id = COALESCE(?, vendor_id),
                start_date = COALESCE(?, start_date),
                due_date = COALESCE(?, due_date),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.status.map(|s| s.as_str()))
        .bind(request.vendor_id.map(|u| u.to_string()))
        .bind(request.start_date)
        .bind(request.due_date)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        tracing::debug!(project_id = %id, "Project updated");
        self.get_project(id).await
    }

    /// Delete a project along with its tasks and deliverables
    pub async fn delete_project(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    account_id: String,
    name: String,
    description: Option<String>,
    status: String,
    vendor_id: Option<String>,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self> {
        Ok(Project {
            id: parse_uuid(&row.id)?,
            account_id: parse_uuid(&row.account_id)?,
            name: row.name,
            description: row.description,
            status: parse_enum(&row.status)?,
            vendor_id: parse_opt_uuid(row.vendor_id)?,
            start_date: row.start_date,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
