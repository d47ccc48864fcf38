//! Project deliverables

use chrono::Utc;
use uuid::Uuid;

use super::{conflict_on_unique, parse_enum, parse_uuid, Store};
use crate::deliverable::{
    check_new_version, CreateDeliverableRequest, DeliverableNumber, DeliverableStatus,
    ProjectDeliverable, VersionRejection,
};
use crate::error::{AppError, Result};

impl Store {
    pub async fn list_deliverables(&self, project_id: Uuid) -> Result<Vec<ProjectDeliverable>> {
        let rows = sqlx::query_as::<_, DeliverableRow>(
            r#"
            SELECT id, project_id, deliverable_number, version, title, type, url, status, client_comment, created_at, updated_at
            FROM project_deliverables
            WHERE project_id = ?
            ORDER BY deliverable_number ASC, version ASC
            "#,
        )
        .bind(project_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn get_deliverable(&self, project_id: Uuid, id: Uuid) -> Result<ProjectDeliverable> {
        let row = sqlx::query_as::<_, DeliverableRow>(
            r#"
            SELECT id, project_id, deliverable_number, version, title, type, url, status, client_comment, created_at, updated_at
            FROM project_deliverables
            WHERE id = ? AND project_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(project_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Deliverable {} not found", id)))?;

        row.try_into()
    }

    /// Create a deliverable version once the previous version was reviewed
    pub async fn create_deliverable(
        &self,
        project_id: Uuid,
        request: CreateDeliverableRequest,
    ) -> Result<ProjectDeliverable> {
        self.get_project(project_id).await?;

        let existing = self.list_deliverables(project_id).await?;
        check_new_version(&existing, request.deliverable_number, request.version)
            .map_err(|e| AppError::Conflict(e.to_string()))?;

        let deliverable = ProjectDeliverable::new(
            project_id,
            request.deliverable_number,
            request.version,
            request.title,
            request.deliverable_type,
            request.url,
        );

        sqlx::query(
            r#"
            INSERT INTO project_deliverables (id, project_id, deliverable_number, version, title, type, url, status, client_comment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(deliverable.id.to_string())
        .bind(project_id.to_string())
        .bind(deliverable.deliverable_number.get() as i64)
        .bind(deliverable.version.as_str())
        .bind(&deliverable.title)
        .bind(deliverable.deliverable_type.as_str())
        .bind(&deliverable.url)
        .bind(deliverable.status.as_str())
        .bind(&deliverable.client_comment)
        .bind(deliverable.created_at)
        .bind(deliverable.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, VersionRejection::Duplicate.to_string()))?;

        tracing::info!(
            deliverable_id = %deliverable.id,
            %project_id,
            number = deliverable.deliverable_number.get(),
            version = deliverable.version.as_str(),
            "Deliverable created"
        );
        Ok(deliverable)
    }

    pub async fn submit_deliverable(
        &self,
        project_id: Uuid,
        id: Uuid,
        url: Option<String>,
    ) -> Result<ProjectDeliverable> {
        let mut deliverable = self.get_deliverable(project_id, id).await?;
        if url.is_none() && deliverable.url.is_none() {
            return Err(AppError::BadRequest(
                "A URL is required to submit a deliverable".to_string(),
            ));
        }
        let from = deliverable.status;
        deliverable.submit(url).map_err(AppError::Conflict)?;
        self.save_transition(&deliverable, from).await?;
        Ok(deliverable)
    }

    pub async fn approve_deliverable(&self, project_id: Uuid, id: Uuid) -> Result<ProjectDeliverable> {
        let mut deliverable = self.get_deliverable(project_id, id).await?;
        let from = deliverable.status;
        deliverable.approve().map_err(AppError::Conflict)?;
        self.save_transition(&deliverable, from).await?;
        Ok(deliverable)
    }

    pub async fn request_deliverable_revision(
        &self,
        project_id: Uuid,
        id: Uuid,
        comment: &str,
    ) -> Result<ProjectDeliverable> {
        if comment.trim().is_empty() {
            return Err(AppError::BadRequest(
                "A comment is required when requesting a revision".to_string(),
            ));
        }

        let mut deliverable = self.get_deliverable(project_id, id).await?;
        let from = deliverable.status;
        deliverable
            .request_revision(comment)
            .map_err(AppError::Conflict)?;
        self.save_transition(&deliverable, from).await?;
        Ok(deliverable)
    }

    pub async fn delete_deliverable(&self, project_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM project_deliverables WHERE id = ? AND project_id = ?")
            .bind(id.to_string())
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Deliverable {} not found", id)));
        }

        Ok(())
    }

    /// Persist a status change, guarded on the status it was made from
    async fn save_transition(
        &self,
        deliverable: &ProjectDeliverable,
        from: DeliverableStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE project_deliverables
            SET url = ?, status = ?, client_comment = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(&deliverable.url)
        .bind(deliverable.status.as_str())
        .bind(&deliverable.client_comment)
        .bind(deliverable.updated_at)
        .bind(deliverable.id.to_string())
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Deliverable {} changed while being updated",
                deliverable.id
            )));
        }

        tracing::info!(
            deliverable_id = %deliverable.id,
            from = from.as_str(),
            to = deliverable.status.as_str(),
            "Deliverable status changed"
        );
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct DeliverableRow {
    id: String,
    project_id: String,
    deliverable_number: i64,
    version: String,
    title: String,
    #[sqlx(rename = "type")]
    deliverable_type: String,
    url: Option<String>,
    status: String,
    client_comment: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<DeliverableRow> for ProjectDeliverable {
    type Error = AppError;

    fn try_from(row: DeliverableRow) -> Result<Self> {
        let number = u8::try_from(row.deliverable_number)
            .map_err(|e| AppError::Internal(format!("Invalid deliverable number: {}", e)))
            .and_then(|n| DeliverableNumber::try_from(n).map_err(AppError::Internal))?;

        Ok(ProjectDeliverable {
            id: parse_uuid(&row.id)?,
            project_id: parse_uuid(&row.project_id)?,
            deliverable_number: number,
            version: parse_enum(&row.version)?,
            title: row.title,
            deliverable_type: parse_enum(&row.deliverable_type)?,
            url: row.url,
            status: parse_enum(&row.status)?,
            client_comment: row.client_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliverable::{DeliverableType, DeliverableVersion};
    use crate::models::{CreateAccountRequest, CreateProjectRequest};
    use crate::store::test_support::setup_test_db;

    async fn make_project(store: &Store) -> Uuid {
        let account = store
            .create_account(CreateAccountRequest {
                name: "Acme".to_string(),
                website: None,
                industry: None,
            })
            .await
            .unwrap();
        store
            .create_project(CreateProjectRequest {
                account_id: account.id,
                name: "Onboarding video".to_string(),
                description: None,
                status: None,
                vendor_id: None,
                start_date: None,
                due_date: None,
            })
            .await
            .unwrap()
            .id
    }

    fn request(number: u8, version: DeliverableVersion, url: Option<&str>) -> CreateDeliverableRequest {
        CreateDeliverableRequest {
            deliverable_number: DeliverableNumber::try_from(number).unwrap(),
            version,
            title: format!("Deliverable {}", number),
            deliverable_type: DeliverableType::Loom,
            url: url.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = setup_test_db().await;
        let project_id = make_project(&store).await;

        store
            .create_deliverable(project_id, request(2, DeliverableVersion::V1, None))
            .await
            .unwrap();
        store
            .create_deliverable(project_id, request(1, DeliverableVersion::V1, Some("https://loom.com/a")))
            .await
            .unwrap();

        let list = store.list_deliverables(project_id).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].deliverable_number.get(), 1);
        assert_eq!(list[0].status, DeliverableStatus::Submitted);
        assert_eq!(list[1].status, DeliverableStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_for_missing_project() {
        let store = setup_test_db().await;
        let result = store
            .create_deliverable(Uuid::new_v4(), request(1, DeliverableVersion::V1, None))
            .await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_version_conflicts() {
        let store = setup_test_db().await;
        let project_id = make_project(&store).await;
        store
            .create_deliverable(project_id, request(1, DeliverableVersion::V1, None))
            .await
            .unwrap();
        let result = store
            .create_deliverable(project_id, request(1, DeliverableVersion::V1, None))
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_full_review_cycle() {
        let store = setup_test_db().await;
        let project_id = make_project(&store).await;

        let v1 = store
            .create_deliverable(project_id, request(1, DeliverableVersion::V1, None))
            .await
            .unwrap();

        // v2 waits for v1 to be reviewed
        let early = store
            .create_deliverable(project_id, request(1, DeliverableVersion::V2, None))
            .await;
        assert!(matches!(early.unwrap_err(), AppError::Conflict(_)));

        // Cannot review before submission
        assert!(matches!(
            store.approve_deliverable(project_id, v1.id).await.unwrap_err(),
            AppError::Conflict(_)
        ));

        let submitted = store
            .submit_deliverable(project_id, v1.id, Some("https://loom.com/v1".to_string()))
            .await
            .unwrap();
        assert_eq!(submitted.status, DeliverableStatus::Submitted);

        let revised = store
            .request_deliverable_revision(project_id, v1.id, "Trim the intro")
            .await
            .unwrap();
        assert_eq!(revised.status, DeliverableStatus::RevisionRequested);

        let fetched = store.get_deliverable(project_id, v1.id).await.unwrap();
        assert_eq!(fetched.client_comment.as_deref(), Some("Trim the intro"));

        let v2 = store
            .create_deliverable(project_id, request(1, DeliverableVersion::V2, Some("https://loom.com/v2")))
            .await
            .unwrap();
        let approved = store.approve_deliverable(project_id, v2.id).await.unwrap();
        assert_eq!(approved.status, DeliverableStatus::Approved);

        assert!(matches!(
            store
                .request_deliverable_revision(project_id, v2.id, "too late")
                .await
                .unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_revision_needs_comment() {
        let store = setup_test_db().await;
        let project_id = make_project(&store).await;
        let d = store
            .create_deliverable(project_id, request(1, DeliverableVersion::V1, Some("https://loom.com/a")))
            .await
            .unwrap();

        let result = store.request_deliverable_revision(project_id, d.id, "  ").await;
        assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));

        let unchanged = store.get_deliverable(project_id, d.id).await.unwrap();
        assert_eq!(unchanged.status, DeliverableStatus::Submitted);
    }

    #[tokio::test]
    async fn test_deliverable_scoped_to_project() {
        let store = setup_test_db().await;
        let project_id = make_project(&store).await;
        let other_project = make_project(&store).await;
        let d = store
            .create_deliverable(project_id, request(1, DeliverableVersion::V1, None))
            .await
            .unwrap();

        assert!(matches!(
            store.get_deliverable(other_project, d.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            store.delete_deliverable(other_project, d.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        store.delete_deliverable(project_id, d.id).await.unwrap();
    }
}
