//! Accounts and contacts

use chrono::Utc;
use uuid::Uuid;

use super::{parse_uuid, Store};
use crate::error::{AppError, Result};
use crate::models::{
    Account, Contact, ContactFilter, CreateAccountRequest, CreateContactRequest,
    UpdateAccountRequest,
};

impl Store {
    // Account operations

    pub async fn create_account(&self, request: CreateAccountRequest) -> Result<Account> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, website, industry, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.website)
        .bind(&request.industry)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Account {
            id,
            name: request.name,
            website: request.website,
            industry: request.industry,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_account(&self, id: Uuid) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, website, industry, created_at, updated_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, website, industry, created_at, updated_at
            FROM accounts
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn update_account(&self, id: Uuid, request: UpdateAccountRequest) -> Result<Account> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = COALESCE(?, name),
                website = COALESCE(?, website),
                industry = COALESCE(?, industry),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(&request.website)
        .bind(&request.industry)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Account {} not found", id)));
        }

        self.get_account(id).await
    }

    /// Delete an account and its contacts; refused while projects reference it
    pub async fn delete_account(&self, id: Uuid) -> Result<()> {
        let (projects,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE account_id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;

        if projects > 0 {
            return Err(AppError::Conflict(format!(
                "Account {} still has {} project(s)",
                id, projects
            )));
        }

        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Account {} not found", id)));
        }

        Ok(())
    }

    // Contact operations

    pub async fn create_contact(&self, request: CreateContactRequest) -> Result<Contact> {
        // Surface a missing account as 404 rather than a constraint failure
        self.get_account(request.account_id).await?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO contacts (id, account_id, name, email, phone, title, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(request.account_id.to_string())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.title)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Contact {
            id,
            account_id: request.account_id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            title: request.title,
            created_at: now,
        })
    }

    pub async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let account_id = filter.account_id.map(|u| u.to_string());

        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT id, account_id, name, email, phone, title, created_at
            FROM contacts
            WHERE (? IS NULL OR account_id = ?)
            ORDER BY name ASC
            "#,
        )
        .bind(&account_id)
        .bind(&account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn delete_contact(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contact {} not found", id)));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    website: Option<String>,
    industry: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Account {
            id: parse_uuid(&row.id)?,
            name: row.name,
            website: row.website,
            industry: row.industry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: String,
    account_id: String,
    name: String,
    email: String,
    phone: Option<String>,
    title: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = AppError;

    fn try_from(row: ContactRow) -> Result<Self> {
        Ok(Contact {
            id: parse_uuid(&row.id)?,
            account_id: parse_uuid(&row.account_id)?,
            name: row.name,
            email: row.email,
            phone: row.phone,
            title: row.title,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::setup_test_db;

    fn account_request(name: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            name: name.to_string(),
            website: None,
            industry: Some("Retail".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_account() {
        let store = setup_test_db().await;
        let created = store.create_account(account_request("Acme")).await.unwrap();
        let fetched = store.get_account(created.id).await.unwrap();
        assert_eq!(fetched.name, "Acme");
        assert_eq!(fetched.industry.as_deref(), Some("Retail"));
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let store = setup_test_db().await;
        let result = store.get_account(Uuid::new_v4()).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_accounts_sorted_by_name() {
        let store = setup_test_db().await;
        store.create_account(account_request("Zeta")).await.unwrap();
        store.create_account(account_request("Alpha")).await.unwrap();

        let accounts = store.list_accounts().await.unwrap();
        let names: Vec<_> = accounts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn test_update_account_keeps_unset_fields() {
        let store = setup_test_db().await;
        let account = store.create_account(account_request("Acme")).await.unwrap();

        let updated = store
            .update_account(
                account.id,
                UpdateAccountRequest {
                    name: Some("Acme Corp".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.industry.as_deref(), Some("Retail"));
    }

    #[tokio::test]
    async fn test_contacts_filtered_by_account() {
        let store = setup_test_db().await;
        let acme = store.create_account(account_request("Acme")).await.unwrap();
        let globex = store.create_account(account_request("Globex")).await.unwrap();

        for (account_id, name) in [(acme.id, "Jane"), (acme.id, "John"), (globex.id, "Hank")] {
            store
                .create_contact(CreateContactRequest {
                    account_id,
                    name: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    phone: None,
                    title: None,
                })
                .await
                .unwrap();
        }

        let acme_contacts = store
            .list_contacts(&ContactFilter {
                account_id: Some(acme.id),
            })
            .await
            .unwrap();
        assert_eq!(acme_contacts.len(), 2);

        let all = store.list_contacts(&ContactFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_contact_for_missing_account() {
        let store = setup_test_db().await;
        let result = store
            .create_contact(CreateContactRequest {
                account_id: Uuid::new_v4(),
                name: "Ghost".to_string(),
                email: "ghost@example.com".to_string(),
                phone: None,
                title: None,
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_account_cascades_contacts() {
        let store = setup_test_db().await;
        let account = store.create_account(account_request("Acme")).await.unwrap();
        store
            .create_contact(CreateContactRequest {
                account_id: account.id,
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                phone: None,
                title: None,
            })
            .await
            .unwrap();

        store.delete_account(account.id).await.unwrap();

        let contacts = store.list_contacts(&ContactFilter::default()).await.unwrap();
        assert!(contacts.is_empty());
        assert!(matches!(
            store.delete_account(account.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
