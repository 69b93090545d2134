use crate::data::violates_constraint;
use crate::domain::contact::{Contact, ContactPatch};
use crate::domain::error::DomainError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

pub const PHONE_TAKEN: &str = "A contact with this phone number already exists";

/// Every lookup and mutation is scoped by owner: a contact that exists but
/// belongs to someone else is reported exactly like a missing one.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: Contact) -> Result<Contact, DomainError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Contact>, DomainError>;
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Contact>, DomainError>;
    async fn find_by_phone(
        &self,
        owner_id: Uuid,
        phone: &str,
    ) -> Result<Option<Contact>, DomainError>;
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, DomainError>;
    /// Returns false when nothing owned by `owner_id` had that id.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresContactRepository {
    pool: PgPool,
}

impl PostgresContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(action: &str, e: sqlx::Error) -> DomainError {
    if violates_constraint(&e, "contacts_owner_phone_key") {
        DomainError::Conflict(PHONE_TAKEN.to_string())
    } else {
        error!("failed to {} contact: {}", action, e);
        DomainError::Internal(format!("database error: {}", e))
    }
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn create(&self, contact: Contact) -> Result<Contact, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (id, owner_id, first_name, last_name, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(contact.id)
        .bind(contact.owner_id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("create", e))?;

        info!(contact_id = %contact.id, owner_id = %contact.owner_id, "contact created");
        Ok(contact)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Contact>, DomainError> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, owner_id, first_name, last_name, phone
            FROM contacts
            WHERE owner_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while listing contacts of {}: {}", owner_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Contact>, DomainError> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, owner_id, first_name, last_name, phone
            FROM contacts
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {} for {}: {}", id, owner_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_by_phone(
        &self,
        owner_id: Uuid,
        phone: &str,
    ) -> Result<Option<Contact>, DomainError> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, owner_id, first_name, last_name, phone
            FROM contacts
            WHERE owner_id = $1 AND phone = $2
            "#,
        )
        .bind(owner_id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_phone for {}: {}", owner_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, DomainError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                phone = COALESCE($3, phone)
            WHERE id = $4 AND owner_id = $5
            RETURNING id, owner_id, first_name, last_name, phone
            "#,
        )
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.phone)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error("update", e))?;

        if contact.is_some() {
            info!(contact_id = %id, "contact updated");
        }

        Ok(contact)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM contacts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete contact {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(contact_id = %id, "contact deleted");
        }
        Ok(removed)
    }
}
