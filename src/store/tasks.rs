//! Tasks

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{parse_enum, parse_opt_uuid, parse_uuid, Store};
use crate::error::{AppError, Result};
use crate::models::{CreateTaskRequest, Task, TaskFilter, TaskStatus, UpdateTaskRequest};

impl Store {
    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<Task> {
        self.get_project(request.project_id).await?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = request.status.unwrap_or(TaskStatus::Todo);

        sqlx::query(
            r#"
            INSERT INTO tasks (id, project_id, title, description, assignee_id, status, due_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(request.project_id.to_string())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.assignee_id.map(|u| u.to_string()))
        .bind(status.as_str())
        .bind(request.due_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Task {
            id,
            project_id: request.project_id,
            title: request.title,
            description: request.description,
            assignee_id: request.assignee_id,
            status,
            due_date: request.due_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, project_id, title, description, assignee_id, status, due_date, created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let project_id = filter.project_id.map(|u| u.to_string());
        let assignee_id = filter.assignee_id.map(|u| u.to_string());
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, project_id, title, description, assignee_id, status, due_date, created_at, updated_at
            FROM tasks
            WHERE (? IS NULL OR project_id = ?)
              AND (? IS NULL OR assignee_id = ?)
              AND (? IS NULL OR status = ?)
            ORDER BY due_date IS NULL, due_date ASC, created_at ASC
            "#,
        )
        .bind(&project_id)
        .bind(&project_id)
        .bind(&assignee_id)
        .bind(&assignee_id)
        .bind(status)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn update_task(&self, id: Uuid, request: UpdateTaskRequest) -> Result<Task> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                assignee_id = COALESCE(?, assignee_id),
                status = COALESCE(?, status),
                due_date = COALESCE(?, due_date),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.assignee_id.map(|u| u.to_string()))
        .bind(request.status.map(|s| s.as_str()))
        .bind(request.due_date)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task {} not found", id)));
        }

        self.get_task(id).await
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task {} not found", id)));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    project_id: String,
    title: String,
    description: Option<String>,
    assignee_id: Option<String>,
    status: String,
    due_date: Option<NaiveDate>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = AppError;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Task {
            id: parse_uuid(&row.id)?,
            project_id: parse_uuid(&row.project_id)?,
            title: row.title,
            description: row.description,
            assignee_id: parse_opt_uuid(row.assignee_id)?,
            status: parse_enum(&row.status)?,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
