//! # FoodFusion
//!
//! The FoodFusion backend: password login protected by a per-client login
//! attempt guard, JWT access tokens, user accounts and profiles, recipes, a
//! community feed with comments and likes, and shared culinary and educational
//! resources.
//!
//! [`FoodFusion`] wires a storage backend to the services in `foodfusion-core`.
//! Every service is reached through it, so an HTTP layer only needs an
//! `Arc<FoodFusion<R>>`.
//!
//! ## Login attempt guard
//!
//! Failed logins are counted per client identifier (usually the remote IP).
//! Once the count reaches the configured threshold the next status check blocks
//! the client for the configured duration. The guard is advisory: when its
//! store is unreachable, logins proceed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use foodfusion::{ClientId, FoodFusion, JwtConfig};
//! use foodfusion_storage_sqlite::SqliteRepositoryProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await?;
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!
//!     let app = FoodFusion::new(repositories, JwtConfig::new_hs256(b"secret".to_vec()));
//!     app.migrate().await?;
//!
//!     let client = ClientId::new("203.0.113.7")?;
//!     let status = app.check_status(&client).await?;
//!     assert!(!status.blocked);
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use foodfusion_core::{
    repositories::{
        CommunityRepositoryAdapter, LoginAttemptRepositoryAdapter, RecipeRepositoryAdapter,
        ResourceRepositoryAdapter, UserRepositoryAdapter,
    },
    services::{
        CommunityService, LoginAttemptGuard, LoginService, RecipeService, ResourceService,
        UserService,
    },
};

pub mod builder;
pub mod config;

pub use builder::{FoodFusionBuilder, FoodFusionBuilderError};
pub use config::{AppConfig, ConfigError};

/// Re-export core types from foodfusion_core
///
/// These types are commonly used when working with the FoodFusion API.
pub use foodfusion_core::{
    AttemptRecord, Author, BlockStatus, Claims, ClientId, Clock, Comment, DashboardStats,
    Difficulty, Error, ExpiredClaims, GuardConfig, JwtConfig, LikeOutcome, ManualClock, Post,
    PostDetail, PostInput, ProfileUpdate, Recipe, RecipeInput, Resource, ResourceInput,
    ResourceKind, SystemClock, TokenIssuer, User, UserContent, UserId,
    error::{AuthError, SessionError, StorageError, ValidationError},
    repositories::RepositoryProvider,
    services::{LoginOutcome, Registration},
};

/// Re-export storage backends
///
/// These storage implementations are available when the corresponding feature is enabled.
#[cfg(feature = "sqlite")]
pub use foodfusion_storage_sqlite::{SqliteRepositoryProvider, connect as connect_sqlite};

/// The main coordinator that owns storage and the services built on it.
///
/// # Example
///
/// ```rust,no_run
/// use foodfusion::{FoodFusion, GuardConfig, JwtConfig, SystemClock};
/// use foodfusion_storage_sqlite::SqliteRepositoryProvider;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = sqlx::SqlitePool::connect("sqlite::memory:").await?;
/// let app = FoodFusion::with_config(
///     Arc::new(SqliteRepositoryProvider::new(pool)),
///     JwtConfig::new_hs256(b"secret".to_vec()),
///     GuardConfig::default().with_failure_threshold(5),
///     Arc::new(SystemClock),
/// );
/// # Ok(())
/// # }
/// ```
pub struct FoodFusion<R: RepositoryProvider> {
    repositories: Arc<R>,
    guard: Arc<LoginAttemptGuard<LoginAttemptRepositoryAdapter<R>>>,
    login_service: LoginService<LoginAttemptRepositoryAdapter<R>, UserRepositoryAdapter<R>>,
    user_service: Arc<UserService<UserRepositoryAdapter<R>>>,
    resource_service: ResourceService<ResourceRepositoryAdapter<R>>,
    recipe_service: RecipeService<RecipeRepositoryAdapter<R>>,
    community_service: CommunityService<CommunityRepositoryAdapter<R>>,
    tokens: Arc<TokenIssuer>,
}

impl<R: RepositoryProvider> FoodFusion<R> {
    /// Create a new instance with the default guard configuration and the system clock.
    pub fn new(repositories: Arc<R>, jwt_config: JwtConfig) -> Self {
        Self::with_config(
            repositories,
            jwt_config,
            GuardConfig::default(),
            Arc::new(SystemClock),
        )
    }

    /// Create a new instance with explicit guard settings and clock.
    ///
    /// The clock drives the login attempt guard only; token timestamps always
    /// use the system time.
    pub fn with_config(
        repositories: Arc<R>,
        jwt_config: JwtConfig,
        guard_config: GuardConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let attempt_repo = Arc::new(LoginAttemptRepositoryAdapter::new(repositories.clone()));
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let resource_repo = Arc::new(ResourceRepositoryAdapter::new(repositories.clone()));
        let recipe_repo = Arc::new(RecipeRepositoryAdapter::new(repositories.clone()));
        let community_repo = Arc::new(CommunityRepositoryAdapter::new(repositories.clone()));

        let guard = Arc::new(LoginAttemptGuard::with_clock(
            attempt_repo,
            guard_config,
            clock,
        ));
        let user_service = Arc::new(UserService::new(user_repo));
        let tokens = Arc::new(TokenIssuer::new(jwt_config));

        Self {
            login_service: LoginService::new(
                guard.clone(),
                user_service.clone(),
                tokens.clone(),
            ),
            resource_service: ResourceService::new(resource_repo),
            recipe_service: RecipeService::new(recipe_repo),
            community_service: CommunityService::new(community_repo),
            repositories,
            guard,
            user_service,
            tokens,
        }
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    pub fn guard_config(&self) -> &GuardConfig {
        self.guard.config()
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Log in with email and password on behalf of `client_id`.
    ///
    /// Blocked clients get `AuthError::RateLimited`; see
    /// [`LoginService::login`] for the full flow.
    pub async fn login(
        &self,
        client_id: &ClientId,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, Error> {
        self.login_service.login(client_id, email, password).await
    }

    /// Check whether `client_id` may attempt a login, activating or lifting a block as needed.
    pub async fn check_status(&self, client_id: &ClientId) -> Result<BlockStatus, Error> {
        self.guard.check_status(client_id).await
    }

    /// Count a failed login for `client_id` made outside [`login`](Self::login).
    ///
    /// The block itself starts at the next [`check_status`](Self::check_status).
    pub async fn record_failure(&self, client_id: &ClientId) -> Result<(), Error> {
        self.guard.record_failure(client_id).await
    }

    /// Report the block state of `client_id` without changing it.
    pub async fn block_status(&self, client_id: &ClientId) -> Result<BlockStatus, Error> {
        self.guard.block_status(client_id).await
    }

    /// Forget every failed attempt recorded for `client_id`.
    pub async fn clear_attempts(&self, client_id: &ClientId) -> Result<(), Error> {
        self.guard.clear_attempts(client_id).await
    }

    /// Start the hourly purge of stale attempt records. Stops when `shutdown` changes.
    pub fn start_cleanup_task(
        &self,
        shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        self.guard.start_cleanup_task(shutdown)
    }

    /// Register a new user with a password.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        self.user_service.register(registration).await
    }

    /// Get a user by their ID
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, Error> {
        self.user_service.get_user(user_id).await
    }

    /// The profile of an active account.
    pub async fn get_profile(&self, user_id: UserId) -> Result<User, Error> {
        self.user_service.get_profile(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        self.user_service.update_profile(user_id, update).await
    }

    /// Deactivate an account. Tokens already issued for it stop authorizing.
    pub async fn deactivate_account(&self, user_id: UserId) -> Result<(), Error> {
        self.user_service.deactivate(user_id).await
    }

    /// Verify an access token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, Error> {
        self.tokens.verify(token)
    }

    /// Resolve an access token to an active user.
    ///
    /// Fails with `AuthError::Unauthorized` when the user no longer exists or
    /// has been deactivated since the token was issued.
    pub async fn authorize(&self, token: &str) -> Result<User, Error> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        match self.user_service.get_user(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::Unauthorized.into()),
        }
    }

    /// Issue a fresh token for a correctly signed token, expired or not.
    pub fn refresh(&self, token: &str) -> Result<String, Error> {
        let claims = self.tokens.decode_ignoring_expiry(token)?;
        self.tokens.refresh(&claims)
    }

    /// Share a new resource as `user_id`.
    pub async fn create_resource(
        &self,
        user_id: UserId,
        kind: ResourceKind,
        input: ResourceInput,
    ) -> Result<Resource, Error> {
        self.resource_service.create(user_id, kind, input).await
    }

    /// Newest resources of `kind`.
    pub async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>, Error> {
        self.resource_service.list(kind).await
    }

    /// Edit a resource owned by `user_id`.
    pub async fn edit_resource(
        &self,
        user_id: UserId,
        kind: ResourceKind,
        resource_id: i64,
        input: ResourceInput,
    ) -> Result<Resource, Error> {
        self.resource_service
            .edit(user_id, kind, resource_id, input)
            .await
    }

    /// Share a new recipe as `user_id`.
    pub async fn create_recipe(&self, user_id: UserId, input: RecipeInput) -> Result<Recipe, Error> {
        self.recipe_service.create(user_id, input).await
    }

    /// Newest recipes from every member.
    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, Error> {
        self.recipe_service.list().await
    }

    pub async fn get_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>, Error> {
        self.recipe_service.get(recipe_id).await
    }

    /// Edit a recipe owned by `user_id`.
    pub async fn edit_recipe(
        &self,
        user_id: UserId,
        recipe_id: i64,
        input: RecipeInput,
    ) -> Result<Recipe, Error> {
        self.recipe_service.edit(user_id, recipe_id, input).await
    }

    /// Publish a community post as `user_id`.
    pub async fn create_post(&self, user_id: UserId, input: PostInput) -> Result<Post, Error> {
        self.community_service.create_post(user_id, input).await
    }

    /// The community feed. Guests (`viewer` is `None`) only see the site's own posts.
    pub async fn list_posts(&self, viewer: Option<UserId>) -> Result<Vec<Post>, Error> {
        self.community_service.list_posts(viewer).await
    }

    pub async fn post_detail(&self, post_id: i64) -> Result<Option<PostDetail>, Error> {
        self.community_service.post_detail(post_id).await
    }

    /// Edit a post owned by `user_id`.
    pub async fn edit_post(
        &self,
        user_id: UserId,
        post_id: i64,
        input: PostInput,
    ) -> Result<Post, Error> {
        self.community_service
            .edit_post(user_id, post_id, input)
            .await
    }

    /// Comment on a post. `None` when the post does not exist.
    pub async fn add_comment(
        &self,
        user_id: UserId,
        post_id: i64,
        comment: &str,
    ) -> Result<Option<Comment>, Error> {
        self.community_service
            .add_comment(user_id, post_id, comment)
            .await
    }

    /// Like or unlike a post. `None` when the post does not exist.
    pub async fn toggle_like(
        &self,
        user_id: UserId,
        post_id: i64,
    ) -> Result<Option<LikeOutcome>, Error> {
        self.community_service.toggle_like(user_id, post_id).await
    }

    /// How much `user_id` has shared, per content type.
    pub async fn dashboard(&self, user_id: UserId) -> Result<DashboardStats, Error> {
        Ok(DashboardStats {
            recipe_count: self.recipe_service.count_by_user(user_id).await?,
            post_count: self.community_service.count_by_user(user_id).await?,
            culinary_count: self
                .resource_service
                .count_by_user(ResourceKind::Culinary, user_id)
                .await?,
            educational_count: self
                .resource_service
                .count_by_user(ResourceKind::Educational, user_id)
                .await?,
        })
    }

    /// Everything `user_id` has shared.
    pub async fn my_content(&self, user_id: UserId) -> Result<UserContent, Error> {
        Ok(UserContent {
            recipes: self.recipe_service.list_by_user(user_id).await?,
            posts: self.community_service.posts_by_user(user_id).await?,
            culinary_resources: self
                .resource_service
                .list_by_user(ResourceKind::Culinary, user_id)
                .await?,
            educational_resources: self
                .resource_service
                .list_by_user(ResourceKind::Educational, user_id)
                .await?,
        })
    }
}
