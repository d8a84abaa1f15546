//! Repository implementations for SQLite storage

pub mod community;
pub mod login_attempt;
pub mod recipe;
pub mod resource;
pub mod user;

pub use community::SqliteCommunityRepository;
pub use login_attempt::SqliteLoginAttemptRepository;
pub use recipe::SqliteRecipeRepository;
pub use resource::SqliteResourceRepository;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodfusion_core::{
    Error,
    error::StorageError,
    repositories::{
        CommunityRepositoryProvider, LoginAttemptRepositoryProvider, RecipeRepositoryProvider,
        RepositoryProvider, ResourceRepositoryProvider, UserRepositoryProvider,
    },
};
use foodfusion_migration::MigrationManager;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::migrations::{self, SqliteMigrationManager};

/// Rows store unix seconds.
fn timestamp(ts: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| StorageError::Database(format!("Invalid timestamp: {ts}")).into())
}

/// Repository provider implementation for SQLite
///
/// This struct implements all the individual repository provider traits
/// as well as the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: Arc<SqliteUserRepository>,
    login_attempt: Arc<SqliteLoginAttemptRepository>,
    resource: Arc<SqliteResourceRepository>,
    recipe: Arc<SqliteRecipeRepository>,
    community: Arc<SqliteCommunityRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let user = Arc::new(SqliteUserRepository::new(pool.clone()));
        let login_attempt = Arc::new(SqliteLoginAttemptRepository::new(pool.clone()));
        let resource = Arc::new(SqliteResourceRepository::new(pool.clone()));
        let recipe = Arc::new(SqliteRecipeRepository::new(pool.clone()));
        let community = Arc::new(SqliteCommunityRepository::new(pool.clone()));

        Self {
            pool,
            user,
            login_attempt,
            resource,
            recipe,
            community,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl LoginAttemptRepositoryProvider for SqliteRepositoryProvider {
    type LoginAttemptRepo = SqliteLoginAttemptRepository;

    fn login_attempt(&self) -> &Self::LoginAttemptRepo {
        &self.login_attempt
    }
}

impl ResourceRepositoryProvider for SqliteRepositoryProvider {
    type ResourceRepo = SqliteResourceRepository;

    fn resource(&self) -> &Self::ResourceRepo {
        &self.resource
    }
}

impl RecipeRepositoryProvider for SqliteRepositoryProvider {
    type RecipeRepo = SqliteRecipeRepository;

    fn recipe(&self) -> &Self::RecipeRepo {
        &self.recipe
    }
}

impl CommunityRepositoryProvider for SqliteRepositoryProvider {
    type CommunityRepo = SqliteCommunityRepository;

    fn community(&self) -> &Self::CommunityRepo {
        &self.community
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&migrations::all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Storage health check failed");
                Error::Storage(StorageError::Unavailable(e.to_string()))
            })?;
        Ok(())
    }
}
