use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::{EMAIL_TAKEN, UserRepository};
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

pub const CREDENTIALS_REQUIRED: &str = "Email and password are required";

pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
}

impl<R: UserRepository + 'static> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            keys: self.keys.clone(),
        }
    }
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Emails are stored and compared exactly as given.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<User, DomainError> {
        require_credentials(email, password)?;

        if self.repo.find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let hash =
            hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))?;
        // The store's unique constraint still guards a concurrent registration.
        self.repo.create(User::new(email.to_string(), hash)).await
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        require_credentials(email, password)?;

        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Authenticates and issues a bearer token for the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self.authenticate(email, password).await?;
        self.keys
            .generate_token(user.id, &user.email)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }

    /// Tokens are stateless, so there is nothing to revoke.
    #[instrument(skip(self))]
    pub fn logout(&self, user_id: Uuid) {
        tracing::debug!(%user_id, "logout acknowledged");
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), DomainError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(DomainError::invalid_input(CREDENTIALS_REQUIRED));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{InMemoryUserRepository, UnavailableStore};

    fn service() -> AuthService<InMemoryUserRepository> {
        AuthService::new(
            Arc::new(InMemoryUserRepository::default()),
            JwtKeys::new("test-secret".into()),
        )
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let auth = service();

        let user = auth.register("alice@x.com", "pw123456").await.unwrap();
        assert_eq!(user.email, "alice@x.com");
        assert_ne!(user.password_hash, "pw123456");

        let found = auth.authenticate("alice@x.com", "pw123456").await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_regardless_of_password() {
        let auth = service();
        auth.register("alice@x.com", "pw123456").await.unwrap();

        let err = auth.register("alice@x.com", "different").await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m == EMAIL_TAKEN));
        assert_eq!(auth.repo.len(), 1);
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let auth = service();
        auth.register("alice@x.com", "pw123456").await.unwrap();

        auth.register("Alice@x.com", "pw123456").await.unwrap();
        assert!(auth.authenticate("ALICE@x.com", "pw123456").await.is_err());
    }

    #[tokio::test]
    async fn missing_fields_are_invalid_input() {
        let auth = service();

        for (email, password) in [("", "pw"), ("a@x.com", ""), ("   ", "pw")] {
            let err = auth.register(email, password).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidInput(ref m) if m == CREDENTIALS_REQUIRED));
            let err = auth.authenticate(email, password).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let auth = service();
        auth.register("alice@x.com", "pw123456").await.unwrap();

        let unknown = auth.authenticate("bob@x.com", "pw123456").await.unwrap_err();
        let wrong = auth.authenticate("alice@x.com", "nope").await.unwrap_err();

        assert!(matches!(unknown, DomainError::InvalidCredentials));
        assert!(matches!(wrong, DomainError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.code(), wrong.code());
    }

    #[tokio::test]
    async fn login_issues_token_for_user() {
        let auth = service();
        let user = auth.register("alice@x.com", "pw123456").await.unwrap();

        let token = auth.login("alice@x.com", "pw123456").await.unwrap();
        let claims = auth.keys().verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "alice@x.com");
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let auth = AuthService::new(Arc::new(UnavailableStore), JwtKeys::new("s".into()));

        let err = auth.register("alice@x.com", "pw123456").await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
