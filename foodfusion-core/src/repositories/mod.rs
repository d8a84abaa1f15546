//! Repository traits for data access layer
//!
//! This module defines the repository interfaces that services use to interact with storage.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] is a supertrait combining all provider traits plus lifecycle methods

pub mod adapter;
pub mod community;
pub mod login_attempt;
pub mod recipe;
pub mod resource;
pub mod user;

pub use adapter::{
    CommunityRepositoryAdapter, LoginAttemptRepositoryAdapter, RecipeRepositoryAdapter,
    ResourceRepositoryAdapter, UserRepositoryAdapter,
};
pub use community::{CommunityRepository, PostFields};
pub use login_attempt::LoginAttemptRepository;
pub use recipe::{RecipeFields, RecipeRepository};
pub use resource::{ResourceFields, ResourceRepository};
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for login attempt repository access.
pub trait LoginAttemptRepositoryProvider: Send + Sync + 'static {
    type LoginAttemptRepo: LoginAttemptRepository;

    fn login_attempt(&self) -> &Self::LoginAttemptRepo;
}

/// Provider trait for resource repository access.
pub trait ResourceRepositoryProvider: Send + Sync + 'static {
    type ResourceRepo: ResourceRepository;

    fn resource(&self) -> &Self::ResourceRepo;
}

/// Provider trait for recipe repository access.
pub trait RecipeRepositoryProvider: Send + Sync + 'static {
    type RecipeRepo: RecipeRepository;

    fn recipe(&self) -> &Self::RecipeRepo;
}

/// Provider trait for community repository access.
pub trait CommunityRepositoryProvider: Send + Sync + 'static {
    type CommunityRepo: CommunityRepository;

    fn community(&self) -> &Self::CommunityRepo;
}

/// Provider trait that storage implementations must implement to provide all repositories.
///
/// Schema creation is an explicit step: callers run [`RepositoryProvider::migrate`]
/// once at deploy time, and no repository method creates tables on demand.
///
/// # Example
///
/// ```rust,ignore
/// use foodfusion_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl LoginAttemptRepositoryProvider for MyStorage {
///     type LoginAttemptRepo = MyLoginAttemptRepository;
///     fn login_attempt(&self) -> &Self::LoginAttemptRepo { &self.login_attempts }
/// }
///
/// // ... implement other provider traits ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider
    + LoginAttemptRepositoryProvider
    + ResourceRepositoryProvider
    + RecipeRepositoryProvider
    + CommunityRepositoryProvider
{
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
