use crate::{
    Error, User, UserId,
    user::{NewUser, ProfileUpdate},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for user data access
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user with its password hash
    ///
    /// Fails with `AuthError::UserAlreadyExists` if the email is taken.
    async fn create(&self, user: NewUser, password_hash: &str) -> Result<User, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error>;

    /// Find a user by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Get the stored password hash for a user
    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, Error>;

    /// Record a successful login
    async fn set_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), Error>;

    /// Overwrite the names given in `update`, leaving the others unchanged
    ///
    /// Returns `None` when no user has that ID.
    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, Error>;

    /// Activate or deactivate an account. Returns `false` when no user has that ID.
    async fn set_active(
        &self,
        id: UserId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, Error>;
}
