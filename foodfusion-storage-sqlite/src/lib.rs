//! SQLite storage backend for FoodFusion
//!
//! ```rust,ignore
//! use foodfusion_storage_sqlite::SqliteRepositoryProvider;
//!
//! let provider = foodfusion_storage_sqlite::connect("sqlite://foodfusion.db?mode=rwc").await?;
//! provider.migrate().await?;
//! ```

pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteCommunityRepository, SqliteLoginAttemptRepository, SqliteRecipeRepository,
    SqliteRepositoryProvider, SqliteResourceRepository, SqliteUserRepository,
};

use foodfusion_core::{Error, error::StorageError};
use sqlx::SqlitePool;

/// Open a connection pool for `database_url` and wrap it in a provider.
///
/// Migrations are not run; call `migrate` on the returned provider.
pub async fn connect(database_url: &str) -> Result<SqliteRepositoryProvider, Error> {
    let pool = SqlitePool::connect(database_url).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to database");
        Error::Storage(StorageError::Connection(
            "Failed to connect to database".to_string(),
        ))
    })?;

    Ok(SqliteRepositoryProvider::new(pool))
}

/// An in-memory pool with every migration applied.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use foodfusion_migration::MigrationManager;

    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    let manager = migrations::SqliteMigrationManager::new(pool.clone());
    manager.initialize().await.unwrap();
    manager.up(&migrations::all()).await.unwrap();
    pool
}
