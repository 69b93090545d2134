//! In-process repositories for tests. They enforce the same uniqueness
//! rules as the database constraints.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::data::contact_repository::{ContactRepository, PHONE_TAKEN};
use crate::data::user_repository::{EMAIL_TAKEN, UserRepository};
use crate::domain::contact::{Contact, ContactPatch};
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict(EMAIL_TAKEN.to_string()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryContactRepository {
    contacts: Mutex<Vec<Contact>>,
}

impl InMemoryContactRepository {
    pub fn get(&self, id: Uuid) -> Option<Contact> {
        let contacts = self.contacts.lock().unwrap();
        contacts.iter().find(|c| c.id == id).cloned()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, contact: Contact) -> Result<Contact, DomainError> {
        let mut contacts = self.contacts.lock().unwrap();
        if contacts
            .iter()
            .any(|c| c.owner_id == contact.owner_id && c.phone == contact.phone)
        {
            return Err(DomainError::Conflict(PHONE_TAKEN.to_string()));
        }
        contacts.push(contact.clone());
        Ok(contact)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Contact>, DomainError> {
        let contacts = self.contacts.lock().unwrap();
        Ok(contacts
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Contact>, DomainError> {
        let contacts = self.contacts.lock().unwrap();
        Ok(contacts
            .iter()
            .find(|c| c.id == id && c.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_phone(
        &self,
        owner_id: Uuid,
        phone: &str,
    ) -> Result<Option<Contact>, DomainError> {
        let contacts = self.contacts.lock().unwrap();
        Ok(contacts
            .iter()
            .find(|c| c.owner_id == owner_id && c.phone == phone)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, DomainError> {
        let mut contacts = self.contacts.lock().unwrap();
        let Some(index) = contacts
            .iter()
            .position(|c| c.id == id && c.owner_id == owner_id)
        else {
            return Ok(None);
        };
        if let Some(phone) = &patch.phone {
            if contacts
                .iter()
                .any(|c| c.id != id && c.owner_id == owner_id && &c.phone == phone)
            {
                return Err(DomainError::Conflict(PHONE_TAKEN.to_string()));
            }
        }
        let contact = &mut contacts[index];
        if let Some(first_name) = patch.first_name {
            contact.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            contact.last_name = last_name;
        }
        if let Some(phone) = patch.phone {
            contact.phone = phone;
        }
        Ok(Some(contact.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, DomainError> {
        let mut contacts = self.contacts.lock().unwrap();
        let before = contacts.len();
        contacts.retain(|c| !(c.id == id && c.owner_id == owner_id));
        Ok(contacts.len() < before)
    }
}

/// Stands in for a store that cannot be reached.
pub struct UnavailableStore;

#[async_trait]
impl UserRepository for UnavailableStore {
    async fn create(&self, _user: User) -> Result<User, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }
}

#[async_trait]
impl ContactRepository for UnavailableStore {
    async fn create(&self, _contact: Contact) -> Result<Contact, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn list_by_owner(&self, _owner_id: Uuid) -> Result<Vec<Contact>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn find_by_id(&self, _id: Uuid, _owner_id: Uuid) -> Result<Option<Contact>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn find_by_phone(
        &self,
        _owner_id: Uuid,
        _phone: &str,
    ) -> Result<Option<Contact>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn update(
        &self,
        _id: Uuid,
        _owner_id: Uuid,
        _patch: ContactPatch,
    ) -> Result<Option<Contact>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn delete(&self, _id: Uuid, _owner_id: Uuid) -> Result<bool, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }
}
