//! Vendors and vendor contacts

use chrono::Utc;
use uuid::Uuid;

use super::{parse_uuid, Store};
use crate::error::{AppError, Result};
use crate::models::{CreateVendorContactRequest, CreateVendorRequest, Vendor, VendorContact};

impl Store {
    pub async fn create_vendor(&self, request: CreateVendorRequest) -> Result<Vendor> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO vendors (id, name, email, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Vendor {
            id,
            name: request.name,
            email: request.email,
            created_at: now,
        })
    }

    pub async fn get_vendor(&self, id: Uuid) -> Result<Vendor> {
        let row = sqlx::query_as::<_, VendorRow>(
            r#"
            SELECT id, name, email, created_at
            FROM vendors
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vendor {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_vendors(&self) -> Result<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, VendorRow>(
            r#"
            SELECT id, name, email, created_at
            FROM vendors
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn create_vendor_contact(
        &self,
        vendor_id: Uuid,
        request: CreateVendorContactRequest,
    ) -> Result<VendorContact> {
        self.get_vendor(vendor_id).await?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO vendor_contacts (id, vendor_id, name, email, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(vendor_id.to_string())
        .bind(&request.name)
        .bind(&request.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(VendorContact {
            id,
            vendor_id,
            name: request.name,
            email: request.email,
            created_at: now,
        })
    }

    pub async fn get_vendor_contact(&self, id: Uuid) -> Result<VendorContact> {
        let row = sqlx::query_as::<_, VendorContactRow>(
            r#"
            SELECT id, vendor_id, name, email, created_at
            FROM vendor_contacts
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vendor contact {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_vendor_contacts(&self, vendor_id: Uuid) -> Result<Vec<VendorContact>> {
        let rows = sqlx::query_as::<_, VendorContactRow>(
            r#"
            SELECT id, vendor_id, name, email, created_at
            FROM vendor_contacts
            WHERE vendor_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(vendor_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct VendorRow {
    id: String,
    name: String,
    email: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

impl TryFrom<VendorRow> for Vendor {
    type Error = AppError;

    fn try_from(row: VendorRow) -> Result<Self> {
        Ok(Vendor {
            id: parse_uuid(&row.id)?,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VendorContactRow {
    id: String,
    vendor_id: String,
    name: String,
    email: String,
    created_at: chrono::DateTime<Utc>,
}

impl TryFrom<VendorContactRow> for VendorContact {
    type Error = AppError;

    fn try_from(row: VendorContactRow) -> Result<Self> {
        Ok(VendorContact {
            id: parse_uuid(&row.id)?,
            vendor_id: parse_uuid(&row.vendor_id)?,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        })
    }
}
