use crate::{
    Error, User, UserId,
    crypto::{hash_password, verify_password},
    error::{AuthError, ValidationError},
    repositories::UserRepository,
    user::{NewUser, ProfileUpdate},
    validation::{normalize_email, validate_email, validate_name, validate_password},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Sign-up details as submitted by the user
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Service for user management operations
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Register a new user with a password
    ///
    /// Fails with `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let first_name = registration.first_name.trim();
        let last_name = registration.last_name.trim();
        validate_name("First name", first_name)?;
        validate_name("Last name", last_name)?;

        let email = normalize_email(&registration.email);
        validate_email(&email)?;

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        validate_password(&registration.password)?;
        let password_hash = hash_password(&registration.password)?;

        let user = self
            .repository
            .create(
                NewUser {
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email,
                },
                &password_hash,
            )
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Authenticate a user with email and password
    ///
    /// An unknown email and a wrong password give the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let email = normalize_email(email);

        let user = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated.into());
        }

        let password_hash = self
            .repository
            .get_password_hash(user.id)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))?;

        if !verify_password(password, &password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.repository.find_by_email(&normalize_email(email)).await
    }

    /// Stamp the time of a successful login
    pub async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> Result<(), Error> {
        self.repository.set_last_login(user_id, at).await
    }

    /// The profile of an active account
    ///
    /// Deactivated and unknown accounts both give `AuthError::UserNotFound`.
    pub async fn get_profile(&self, user_id: UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(Error::Auth(AuthError::UserNotFound))
    }

    /// Change the name fields present in `update`
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        if update.is_empty() {
            return Err(ValidationError::MissingField("No data to update".to_string()).into());
        }

        let first_name = update.first_name.map(|name| name.trim().to_string());
        let last_name = update.last_name.map(|name| name.trim().to_string());
        if let Some(name) = &first_name {
            validate_name("First name", name)?;
        }
        if let Some(name) = &last_name {
            validate_name("Last name", name)?;
        }

        let user = self
            .repository
            .update_profile(
                user_id,
                ProfileUpdate {
                    first_name,
                    last_name,
                },
                Utc::now(),
            )
            .await?
            .ok_or(Error::Auth(AuthError::UserNotFound))?;

        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(user)
    }

    /// Deactivate an account. It can no longer log in.
    pub async fn deactivate(&self, user_id: UserId) -> Result<(), Error> {
        if !self.repository.set_active(user_id, false, Utc::now()).await? {
            return Err(AuthError::UserNotFound.into());
        }

        tracing::info!(user_id = %user_id, "Account deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MockUserRepository;

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            first_name: "Julia".to_string(),
            last_name: "Child".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn service() -> (UserService<MockUserRepository>, Arc<MockUserRepository>) {
        let repo = Arc::new(MockUserRepository::default());
        (UserService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let (service, _) = service();

        let user = service
            .register(registration("  Julia@Example.COM ", "Bouillabaisse1"))
            .await
            .unwrap();

        assert_eq!(user.email, "julia@example.com");
        assert_eq!(user.first_name, "Julia");
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _) = service();
        service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();

        let result = service
            .register(registration("JULIA@example.com", "Bouillabaisse1"))
            .await;
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::UserAlreadyExists))
        ));
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let (service, _) = service();

        let result = service
            .register(registration("julia@example.com", "weak"))
            .await;
        let Err(Error::Validation(ValidationError::InvalidPassword(message))) = result else {
            panic!("expected password validation error");
        };
        assert!(message.contains("at least 8 characters"));
        assert!(message.contains(". "));
    }

    #[tokio::test]
    async fn test_register_requires_names() {
        let (service, _) = service();
        let mut reg = registration("julia@example.com", "Bouillabaisse1");
        reg.last_name = "  ".to_string();

        let result = service.register(reg).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::MissingField(_)))
        ));
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let (service, _) = service();

        let result = service
            .register(registration("not-an-email", "Bouillabaisse1"))
            .await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidEmail(_)))
        ));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (service, _) = service();
        let registered = service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();

        let user = service
            .authenticate("Julia@example.com", "Bouillabaisse1")
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let (service, _) = service();
        service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();

        let wrong_password = service
            .authenticate("julia@example.com", "Bouillabaisse2")
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate("nobody@example.com", "Bouillabaisse1")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(wrong_password.is_auth_error());
    }

    #[tokio::test]
    async fn test_authenticate_deactivated() {
        let (service, repo) = service();
        service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();
        repo.deactivate("julia@example.com");

        let result = service
            .authenticate("julia@example.com", "Bouillabaisse1")
            .await;
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::AccountDeactivated))
        ));
    }

    #[tokio::test]
    async fn test_record_login() {
        let (service, _) = service();
        let user = service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();

        let now = Utc::now();
        service.record_login(user.id, now).await.unwrap();

        let user = service.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(user.last_login_at, Some(now));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (service, _) = service();
        let user = service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();

        let updated = service
            .update_profile(
                user.id,
                ProfileUpdate {
                    first_name: Some("  Jules ".to_string()),
                    last_name: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Jules");
        assert_eq!(updated.last_name, "Child");
    }

    #[tokio::test]
    async fn test_update_profile_rejects_empty() {
        let (service, _) = service();
        let user = service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();

        let err = service
            .update_profile(user.id, ProfileUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: No data to update");

        let err = service
            .update_profile(
                user.id,
                ProfileUpdate {
                    first_name: None,
                    last_name: Some(" ".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Last name is required");
    }

    #[tokio::test]
    async fn test_update_profile_unknown_user() {
        let (service, _) = service();

        let result = service
            .update_profile(
                UserId::new(9),
                ProfileUpdate {
                    first_name: Some("Ghost".to_string()),
                    last_name: None,
                },
            )
            .await;
        assert!(matches!(result, Err(Error::Auth(AuthError::UserNotFound))));
    }

    #[tokio::test]
    async fn test_deactivate_hides_profile_and_blocks_login() {
        let (service, _) = service();
        let user = service
            .register(registration("julia@example.com", "Bouillabaisse1"))
            .await
            .unwrap();
        assert_eq!(service.get_profile(user.id).await.unwrap().id, user.id);

        service.deactivate(user.id).await.unwrap();

        assert!(matches!(
            service.get_profile(user.id).await,
            Err(Error::Auth(AuthError::UserNotFound))
        ));
        assert!(matches!(
            service
                .authenticate("julia@example.com", "Bouillabaisse1")
                .await,
            Err(Error::Auth(AuthError::AccountDeactivated))
        ));
        assert!(matches!(
            service.deactivate(UserId::new(9)).await,
            Err(Error::Auth(AuthError::UserNotFound))
        ));
    }
}
