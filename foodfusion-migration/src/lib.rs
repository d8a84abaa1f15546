//! Schema migrations for FoodFusion storage backends
//!
//! A backend lists its migrations as `Box<dyn Migration<DB>>` and applies them
//! through its [`MigrationManager`]. Applied versions are recorded in a tracking
//! table so `up` is idempotent.
//!
//! Migrations are only ever run by an explicit call (the `migrate` CLI
//! subcommand or `FoodFusion::migrate`); no request path creates tables.
use async_trait::async_trait;
use foodfusion_core::error::StorageError;
use sqlx::Database;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Migration versions out of order: {0} follows {1}")]
    OutOfOrder(i64, i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MigrationError> for foodfusion_core::Error {
    fn from(error: MigrationError) -> Self {
        StorageError::Migration(error.to_string()).into()
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Execute the migration
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Rollback the migration
    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique version number for ordering migrations
    fn version(&self) -> i64;

    /// Human readable name of the migration
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix seconds
    pub applied_at: i64,
}

/// Reject a migration list whose versions are not strictly increasing.
pub fn check_order<DB: Database>(migrations: &[Box<dyn Migration<DB>>]) -> Result<()> {
    for pair in migrations.windows(2) {
        if pair[1].version() <= pair[0].version() {
            return Err(MigrationError::OutOfOrder(
                pair[1].version(),
                pair[0].version(),
            ));
        }
    }
    Ok(())
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        "_foodfusion_migrations"
    }

    /// Initialize migration tracking table
    async fn initialize(&self) -> Result<()>;

    /// Apply pending migrations in order
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Rollback applied migrations in reverse order
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Get list of applied migrations
    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    /// Check if specific migration was applied
    async fn is_applied(&self, version: i64) -> Result<bool>;
}
