//! Builder pattern for constructing FoodFusion instances
//!
//! This module provides a type-safe builder for creating [`FoodFusion`] instances with
//! compile-time validation of storage configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use foodfusion::{FoodFusionBuilder, JwtConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build with SQLite and auto-migration
//!     let app = FoodFusionBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .with_jwt(JwtConfig::new_hs256(b"secret".to_vec()))
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use foodfusion_core::{Clock, GuardConfig, JwtConfig, SystemClock, repositories::RepositoryProvider};

use crate::FoodFusion;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when building a FoodFusion instance.
#[derive(Debug, thiserror::Error)]
pub enum FoodFusionBuilderError {
    /// Failed to connect to storage backend
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    /// Failed to run database migrations
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

// ============================================================================
// Type-State Markers
// ============================================================================

/// Marker type indicating no storage has been configured yet.
///
/// This is the initial state of [`FoodFusionBuilder`].
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

// ============================================================================
// Builder Implementation
// ============================================================================

/// A type-safe builder for constructing [`FoodFusion`] instances.
///
/// Storage must be configured before [`build`](FoodFusionBuilder::build) is
/// available, and a JWT configuration must be supplied before it succeeds.
///
/// # Type States
///
/// - [`NoStorage`]: Initial state, storage must be configured
/// - [`WithStorage<R>`]: Storage configured, ready to build or add more configuration
pub struct FoodFusionBuilder<Storage> {
    storage: Storage,
    jwt_config: Option<JwtConfig>,
    guard_config: GuardConfig,
    clock: Arc<dyn Clock>,
    apply_migrations: bool,
}

impl Default for FoodFusionBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodFusionBuilder<NoStorage> {
    /// Create a new builder with default configuration.
    ///
    /// # Defaults
    ///
    /// - Login attempt guard: enabled, 3 failures, 60 second block
    /// - Clock: system time
    /// - Apply migrations: false
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            jwt_config: None,
            guard_config: GuardConfig::default(),
            clock: Arc::new(SystemClock),
            apply_migrations: false,
        }
    }

    /// Use an already constructed repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> FoodFusionBuilder<WithStorage<R>> {
        FoodFusionBuilder {
            storage: WithStorage { repositories },
            jwt_config: self.jwt_config,
            guard_config: self.guard_config,
            clock: self.clock,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl FoodFusionBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite::memory:" or "sqlite://foodfusion.db?mode=rwc")
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<
        FoodFusionBuilder<WithStorage<crate::SqliteRepositoryProvider>>,
        FoodFusionBuilderError,
    > {
        let provider = foodfusion_storage_sqlite::connect(url)
            .await
            .map_err(|e| FoodFusionBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_repositories(Arc::new(provider)))
    }

    /// Configure SQLite storage with an existing connection pool.
    pub fn with_sqlite_pool(
        self,
        pool: sqlx::SqlitePool,
    ) -> FoodFusionBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        self.with_repositories(Arc::new(crate::SqliteRepositoryProvider::new(pool)))
    }
}

// ============================================================================
// Configuration Methods (available after storage is configured)
// ============================================================================

impl<R: RepositoryProvider> FoodFusionBuilder<WithStorage<R>> {
    /// Set the access token signing configuration. Required.
    pub fn with_jwt(mut self, config: JwtConfig) -> Self {
        self.jwt_config = Some(config);
        self
    }

    /// Configure the login attempt guard.
    ///
    /// Default: enabled with 3 attempts and a 60 second block
    pub fn with_guard_config(mut self, config: GuardConfig) -> Self {
        self.guard_config = config;
        self
    }

    /// Replace the clock used by the login attempt guard.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set whether to automatically apply database migrations during build.
    ///
    /// Default: false
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }

    /// Build the FoodFusion instance.
    ///
    /// Validates the guard and JWT configuration, then applies migrations if
    /// `apply_migrations(true)` was called.
    pub async fn build(self) -> Result<FoodFusion<R>, FoodFusionBuilderError> {
        let jwt_config = self.jwt_config.ok_or_else(|| {
            FoodFusionBuilderError::InvalidConfiguration("JWT configuration is required".into())
        })?;
        jwt_config
            .validate()
            .map_err(|e| FoodFusionBuilderError::InvalidConfiguration(e.to_string()))?;
        self.guard_config
            .validate()
            .map_err(|e| FoodFusionBuilderError::InvalidConfiguration(e.to_string()))?;

        if self.apply_migrations {
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| FoodFusionBuilderError::Migration(e.to_string()))?;
            tracing::info!("Database migrations applied");
        }

        tracing::debug!(
            guard_enabled = self.guard_config.enabled,
            failure_threshold = self.guard_config.failure_threshold,
            block_seconds = self.guard_config.block_duration.num_seconds(),
            "Login attempt guard configured"
        );

        Ok(FoodFusion::with_config(
            self.storage.repositories,
            jwt_config,
            self.guard_config,
            self.clock,
        ))
    }
}
