use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::contact_repository::{ContactRepository, PHONE_TAKEN};
use crate::domain::contact::{Contact, ContactDraft, ContactPatch, normalize_phone};
use crate::domain::error::DomainError;

pub const OWNER_REQUIRED: &str = "ownerId is required";
pub const FIELDS_REQUIRED: &str = "firstName, lastName and phone are required";
pub const INVALID_PHONE: &str = "phone must be 10-20 characters and contain only numeric digits";
pub const INVALID_NAME: &str = "firstName and lastName must not be empty";
pub const CONTACT_NOT_FOUND: &str = "Contact not found";

pub struct ContactService<R: ContactRepository + 'static> {
    repo: Arc<R>,
}

impl<R: ContactRepository + 'static> Clone for ContactService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> ContactService<R>
where
    R: ContactRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Contact>, DomainError> {
        let owner_id = require_owner(owner_id)?;
        self.repo.list_by_owner(owner_id).await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, owner_id: Uuid, draft: ContactDraft) -> Result<Contact, DomainError> {
        let owner_id = require_owner(owner_id)?;

        let (Some(first_name), Some(last_name), Some(phone)) = (
            present(draft.first_name),
            present(draft.last_name),
            present(draft.phone),
        ) else {
            return Err(DomainError::invalid_input(FIELDS_REQUIRED));
        };
        let phone = normalize_phone(&phone)
            .ok_or_else(|| DomainError::invalid_input(INVALID_PHONE))?
            .to_string();

        if self.repo.find_by_phone(owner_id, &phone).await?.is_some() {
            return Err(DomainError::Conflict(PHONE_TAKEN.to_string()));
        }

        let contact = Contact::new(owner_id, first_name, last_name, phone);
        self.repo.create(contact).await
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        contact_id: Uuid,
        owner_id: Uuid,
        mut patch: ContactPatch,
    ) -> Result<Contact, DomainError> {
        let owner_id = require_owner(owner_id)?;

        for name in [&patch.first_name, &patch.last_name].into_iter().flatten() {
            if name.trim().is_empty() {
                return Err(DomainError::invalid_input(INVALID_NAME));
            }
        }

        if let Some(phone) = patch.phone.take() {
            patch.phone = Some(
                normalize_phone(&phone)
                    .ok_or_else(|| DomainError::invalid_input(INVALID_PHONE))?
                    .to_string(),
            );
        }

        // Foreign and missing ids must fail the same way before any conflict check.
        if self.repo.find_by_id(contact_id, owner_id).await?.is_none() {
            return Err(not_found());
        }

        if let Some(phone) = patch.phone.as_deref() {
            let holder = self.repo.find_by_phone(owner_id, phone).await?;
            if holder.is_some_and(|c| c.id != contact_id) {
                return Err(DomainError::Conflict(PHONE_TAKEN.to_string()));
            }
        }

        self.repo
            .update(contact_id, owner_id, patch)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, contact_id: Uuid, owner_id: Uuid) -> Result<(), DomainError> {
        let owner_id = require_owner(owner_id)?;

        if self.repo.delete(contact_id, owner_id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }
}

/// The nil UUID stands for an absent owner.
fn require_owner(owner_id: Uuid) -> Result<Uuid, DomainError> {
    if owner_id.is_nil() {
        Err(DomainError::invalid_input(OWNER_REQUIRED))
    } else {
        Ok(owner_id)
    }
}

fn not_found() -> DomainError {
    DomainError::NotFound(CONTACT_NOT_FOUND.to_string())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
