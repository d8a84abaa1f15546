//! Service layer for business logic
//!
//! Services hold their repositories behind `Arc` and are shared across request
//! handlers without further locking.

pub mod community;
pub mod login;
pub mod login_guard;
pub mod recipe;
pub mod resource;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use community::CommunityService;
pub use login::{LoginOutcome, LoginService};
pub use login_guard::LoginAttemptGuard;
pub use recipe::RecipeService;
pub use resource::ResourceService;
pub use user::{Registration, UserService};
