use serde::Serialize;
use uuid::Uuid;

pub const PHONE_MIN_LEN: usize = 10;
pub const PHONE_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl Contact {
    pub fn new(owner_id: Uuid, first_name: String, last_name: String, phone: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            first_name,
            last_name,
            phone,
        }
    }
}

/// Unvalidated input for a new contact.
#[derive(Debug, Clone, Default)]
pub struct ContactDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Partial update of a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone.is_none()
    }
}

/// After trimming, a phone is 10 to 20 ASCII decimal digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let len = phone.chars().count();

    (PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len) && phone.chars().all(|c| c.is_ascii_digit())
}

/// The trimmed phone, if valid. This is the form that gets stored.
pub fn normalize_phone(phone: &str) -> Option<&str> {
    is_valid_phone(phone).then(|| phone.trim())
}
