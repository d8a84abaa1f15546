//! User accounts
//!
//! Users log in with an email address and password. The core user struct is defined as follows:
//!
//! | Field            | Type               | Description                                        |
//! | ---------------- | ------------------ | -------------------------------------------------- |
//! | `id`             | `UserId`           | The database identifier for the user.              |
//! | `first_name`     | `String`           | The user's first name.                             |
//! | `last_name`      | `String`           | The user's last name.                              |
//! | `email`          | `String`           | The lower-cased email the user logs in with.       |
//! | `is_active`      | `bool`             | Deactivated users cannot log in.                   |
//! | `email_verified` | `bool`             | Whether the email address has been confirmed.      |
//! | `created_at`     | `DateTime`         | The timestamp when the user was created.           |
//! | `last_login_at`  | `Option<DateTime>` | The timestamp of the most recent successful login. |
//!
//! The password hash is not part of `User`; it stays behind the repository.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, error::ValidationError};

/// A database-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        UserId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(UserId)
            .map_err(|_| ValidationError::InvalidField(format!("Invalid user ID: {s}")))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn author(&self) -> Author {
        Author {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// The public name shown next to content a user created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    /// Both halves of a joined name, or `None` when the author row is gone.
    pub fn from_parts(first_name: Option<String>, last_name: Option<String>) -> Option<Self> {
        Some(Author {
            first_name: first_name?,
            last_name: last_name?,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Name changes for a profile. Omitted fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    is_active: Option<bool>,
    email_verified: bool,
    created_at: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn email_verified(mut self, email_verified: bool) -> Self {
        self.email_verified = email_verified;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn last_login_at(mut self, last_login_at: Option<DateTime<Utc>>) -> Self {
        self.last_login_at = last_login_at;
        self
    }

    pub fn build(self) -> Result<User, Error> {
        Ok(User {
            id: self
                .id
                .ok_or(ValidationError::MissingField("User ID is required".to_string()))?,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self
                .email
                .ok_or(ValidationError::MissingField("Email is required".to_string()))?,
            is_active: self.is_active.unwrap_or(true),
            email_verified: self.email_verified,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            last_login_at: self.last_login_at,
        })
    }
}

/// A validated user ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
