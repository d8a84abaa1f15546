//! Core functionality for the FoodFusion backend
//!
//! This crate holds the domain types, the repository traits that storage
//! backends implement, and the services built on them:
//!
//! - [`LoginAttemptGuard`](services::LoginAttemptGuard): per-client failed login
//!   counting with a timed block
//! - [`LoginService`](services::LoginService): password login wired through the guard
//! - [`TokenIssuer`]: JWT access tokens and refresh
//! - [`UserService`](services::UserService) for accounts and profiles
//! - [`ResourceService`](services::ResourceService),
//!   [`RecipeService`](services::RecipeService) and
//!   [`CommunityService`](services::CommunityService) for shared content
//!
//! Storage backends implement [`repositories::RepositoryProvider`]; see
//! `foodfusion-storage-sqlite`.
pub mod client;
pub mod clock;
pub mod community;
pub mod crypto;
pub mod dashboard;
pub mod error;
pub mod recipe;
pub mod repositories;
pub mod resource;
pub mod services;
pub mod storage;
pub mod token;
pub mod user;
pub mod validation;

pub use client::ClientId;
pub use clock::{Clock, ManualClock, SystemClock};
pub use community::{Comment, LikeOutcome, Post, PostDetail, PostInput};
pub use dashboard::{DashboardStats, UserContent};
pub use error::Error;
pub use recipe::{Difficulty, Recipe, RecipeInput};
pub use resource::{Resource, ResourceInput, ResourceKind};
pub use storage::{AttemptRecord, BlockStatus, GuardConfig};
pub use token::{Claims, ExpiredClaims, JwtConfig, TokenIssuer};
pub use user::{Author, NewUser, ProfileUpdate, User, UserId};
