//! Password login guarded by per-client attempt counting.
//!
//! The guard is advisory: if the attempt store cannot be reached the login
//! proceeds as if the client were not blocked, and the failure is logged.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::{
    ClientId, Error, User,
    error::{AuthError, ValidationError},
    repositories::{LoginAttemptRepository, UserRepository},
    services::{LoginAttemptGuard, UserService},
    storage::BlockStatus,
    token::TokenIssuer,
};

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

pub struct LoginService<A: LoginAttemptRepository, U: UserRepository> {
    guard: Arc<LoginAttemptGuard<A>>,
    users: Arc<UserService<U>>,
    tokens: Arc<TokenIssuer>,
}

impl<A: LoginAttemptRepository, U: UserRepository> LoginService<A, U> {
    pub fn new(
        guard: Arc<LoginAttemptGuard<A>>,
        users: Arc<UserService<U>>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            guard,
            users,
            tokens,
        }
    }

    /// Log in with email and password on behalf of `client_id`.
    ///
    /// # Errors
    ///
    /// - `AuthError::RateLimited` if the client is blocked, either before the
    ///   attempt or as a result of this failure
    /// - `ValidationError::MissingField` for a blank email or password; these
    ///   are not counted as failed attempts
    /// - `AuthError::InvalidCredentials` or `AuthError::AccountDeactivated`
    pub async fn login(
        &self,
        client_id: &ClientId,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, Error> {
        if let Some(status) = self.blocked_status(client_id).await {
            tracing::info!(client_id = %client_id, "Rejected login from blocked client");
            return Err(AuthError::RateLimited(status).into());
        }

        if email.trim().is_empty() {
            return Err(ValidationError::MissingField("Email is required".to_string()).into());
        }
        if password.trim().is_empty() {
            return Err(ValidationError::MissingField("Password is required".to_string()).into());
        }

        let user = match self.users.authenticate(email, password).await {
            Ok(user) => user,
            Err(e) if e.is_auth_error() => {
                if let Err(store_error) = self.guard.record_failure(client_id).await {
                    tracing::warn!(
                        client_id = %client_id,
                        error = %store_error,
                        "Could not record failed login"
                    );
                }

                if let Some(status) = self.blocked_status(client_id).await {
                    return Err(AuthError::RateLimited(status).into());
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.guard.clear_attempts(client_id).await {
            tracing::warn!(
                client_id = %client_id,
                error = %e,
                "Could not clear login attempts"
            );
        }

        let now = Utc::now();
        if let Err(e) = self.users.record_login(user.id, now).await {
            tracing::warn!(user_id = %user.id, error = %e, "Could not record last login");
        }

        let token = self.tokens.issue(user.id, &user.email)?;
        tracing::info!(user_id = %user.id, client_id = %client_id, "User logged in");

        Ok(LoginOutcome {
            token,
            user: User {
                last_login_at: Some(now),
                ..user
            },
        })
    }

    /// `Some` only when the guard positively reports a block.
    async fn blocked_status(&self, client_id: &ClientId) -> Option<BlockStatus> {
        match self.guard.check_status(client_id).await {
            Ok(status) if status.blocked => Some(status),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    client_id = %client_id,
                    error = %e,
                    "Login guard unavailable, allowing attempt"
                );
                None
            }
        }
    }
}
