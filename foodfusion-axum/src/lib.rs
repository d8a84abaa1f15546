//! # FoodFusion Axum Integration
//!
//! HTTP routes for the FoodFusion backend. Every endpoint answers with the JSON
//! envelope `{ "success": bool, "message": string, "data"?: ... }`.
//!
//! | Method | Path                  | Auth   | Description                                |
//! | ------ | --------------------- | ------ | ------------------------------------------ |
//! | GET    | `/health`             |        | Storage health check                       |
//! | POST   | `/login`              |        | Email and password login, guarded per IP   |
//! | GET    | `/check-block-status` |        | Block state of the calling client          |
//! | POST   | `/refresh`            | Bearer | New token for a valid or expired token     |
//! | POST   | `/signup`             |        | Register and receive a token               |
//! | GET    | `/resources/{kind}`   |        | Newest `culinary` or `educational` entries |
//! | POST   | `/resources/{kind}`   | Bearer | Share a resource                           |
//! | PUT    | `/edit-resource`      | Bearer | Edit a resource you own                    |
//! | GET    | `/recipes`            |        | Newest recipes                             |
//! | POST   | `/recipes`            | Bearer | Share a recipe                             |
//! | GET    | `/recipe-detail?id=`  |        | One recipe                                 |
//! | PUT    | `/edit-recipe`        | Bearer | Edit a recipe you own                      |
//! | GET    | `/community`          | Opt.   | Feed; guests only see the site's posts     |
//! | POST   | `/community`          | Bearer | Publish a post                             |
//! | GET    | `/post-detail?id=`    |        | A post with likes and recent comments      |
//! | PUT    | `/edit-post`          | Bearer | Edit a post you own                        |
//! | POST   | `/add-comment`        | Bearer | Comment on a post                          |
//! | POST   | `/like-post`          | Bearer | Like a post, or take the like back         |
//! | GET    | `/profile`            | Bearer | Your profile                               |
//! | PUT    | `/profile`            | Bearer | Change your first or last name             |
//! | DELETE | `/profile`            | Bearer | Deactivate your account                    |
//! | GET    | `/dashboard`          | Bearer | Counts of what you have shared             |
//! | GET    | `/my-content`         | Bearer | Everything you have shared                 |
//! | POST   | `/logout`             |        | Acknowledge a client-side logout           |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::{net::SocketAddr, sync::Arc};
//! use foodfusion::{FoodFusionBuilder, JwtConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = FoodFusionBuilder::new()
//!         .with_sqlite("sqlite://foodfusion.db?mode=rwc")
//!         .await?
//!         .with_jwt(JwtConfig::new_hs256(b"change-me".to_vec()))
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let router = foodfusion_axum::routes(Arc::new(app)).build();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(
//!         listener,
//!         router.into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;

pub use error::{ApiError, GENERIC_ERROR_MESSAGE, Result};
pub use extractors::{AuthUser, BearerToken, ClientIp, ClientIpConfig};
pub use middleware::auth_middleware;
pub use routes::{AppState, create_router};
pub use types::{
    ApiResponse, BlockStatusResponse, CommentRequest, DashboardResponse, EditPostRequest,
    EditRecipeRequest, EditResourceRequest, HealthResponse, IdQuery, LikeRequest, LikeResponse,
    LoginRequest, PostCreatedResponse, ProfileRequest, RecipeCreatedResponse,
    ResourceCreatedResponse, ResourceListResponse, ResourceRequest, SignupRequest, SignupResponse,
    TokenResponse,
};

use axum::Router;
use foodfusion::{FoodFusion, RepositoryProvider};
use std::sync::Arc;

/// Create the FoodFusion routes.
///
/// The returned builder produces a [`Router`] that can be served directly or
/// nested under a prefix. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so clients without
/// proxy headers are identified by their peer address.
pub fn routes<R>(app: Arc<FoodFusion<R>>) -> RouterBuilder<R>
where
    R: RepositoryProvider,
{
    RouterBuilder {
        app,
        client_ip_config: ClientIpConfig::default(),
    }
}

/// Builder for configuring the FoodFusion routes
pub struct RouterBuilder<R: RepositoryProvider> {
    app: Arc<FoodFusion<R>>,
    client_ip_config: ClientIpConfig,
}

impl<R: RepositoryProvider> RouterBuilder<R> {
    /// Trust `Client-IP` and `X-Forwarded-For` when identifying clients.
    ///
    /// Default: false. Only turn this on behind a proxy that overwrites these
    /// headers, otherwise a client can pick its own identifier.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.client_ip_config.trust_proxy_headers = trust;
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        if self.client_ip_config.trust_proxy_headers {
            tracing::warn!(
                "Trusting Client-IP and X-Forwarded-For to identify clients; \
                 these must be set by a proxy, not by the client"
            );
        }
        create_router(self.app, self.client_ip_config)
    }
}
