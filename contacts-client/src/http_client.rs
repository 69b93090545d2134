use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ContactsClientError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {} ({})",
            self.id, self.first_name, self.last_name, self.phone
        )
    }
}

/// Fields for a create or update call. Absent fields are left out of the
/// request body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Clone)]
pub struct ContactsClient {
    client: Arc<Client>,
    base_url: String,
    token: Option<String>,
}

impl ContactsClient {
    pub fn connect(endpoint: &str) -> Result<Self, ContactsClientError> {
        Ok(Self {
            client: Arc::new(Client::builder().build()?),
            base_url: endpoint.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, ContactsClientError> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(req.bearer_auth(token)),
            _ => Err(ContactsClientError::MissingToken),
        }
    }

    async fn send(req: RequestBuilder) -> Result<reqwest::Response, ContactsClientError> {
        let resp = req.send().await?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(ContactsClientError::from_http_response(resp).await)
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<(), ContactsClientError> {
        let req = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        Self::send(req).await?;
        Ok(())
    }

    /// Logs in and keeps the returned token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String, ContactsClientError> {
        let req = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let auth: TokenResponse = Self::send(req).await?.json().await?;
        self.set_token(auth.token.clone());
        Ok(auth.token)
    }

    /// Tells the server the session is over. Tokens are stateless, so
    /// callers should also discard their copy.
    pub async fn logout(&self) -> Result<(), ContactsClientError> {
        let req = self.authorized(self.client.post(self.url("/auth/logout")))?;
        Self::send(req).await?;
        Ok(())
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ContactsClientError> {
        let req = self.authorized(self.client.get(self.url("/contacts")))?;
        Ok(Self::send(req).await?.json().await?)
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<Contact, ContactsClientError> {
        let req = self
            .authorized(self.client.post(self.url("/contacts")))?
            .json(contact);
        Ok(Self::send(req).await?.json().await?)
    }

    pub async fn update_contact(
        &self,
        id: Uuid,
        changes: &NewContact,
    ) -> Result<Contact, ContactsClientError> {
        let req = self
            .authorized(self.client.patch(self.url(&format!("/contacts/{id}"))))?
            .json(changes);
        Ok(Self::send(req).await?.json().await?)
    }

    pub async fn delete_contact(&self, id: Uuid) -> Result<(), ContactsClientError> {
        let req = self.authorized(self.client.delete(self.url(&format!("/contacts/{id}"))))?;
        Self::send(req).await?;
        Ok(())
    }
}
