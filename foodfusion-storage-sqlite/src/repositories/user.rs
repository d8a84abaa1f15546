use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodfusion_core::{
    Error, NewUser, ProfileUpdate, User, UserId,
    error::{AuthError, StorageError},
    repositories::UserRepository,
};
use sqlx::SqlitePool;

use super::timestamp;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Columns selected for a [`User`]; the password hash is never read here.
const USER_COLUMNS: &str =
    "id, first_name, last_name, email, is_active, email_verified, created_at, last_login_at";

#[derive(Debug, sqlx::FromRow)]
struct SqliteUser {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    is_active: bool,
    email_verified: bool,
    created_at: i64,
    last_login_at: Option<i64>,
}

impl TryFrom<SqliteUser> for User {
    type Error = Error;

    fn try_from(row: SqliteUser) -> Result<Self, Self::Error> {
        let last_login_at = match row.last_login_at {
            Some(ts) => Some(timestamp(ts)?),
            None => None,
        };

        User::builder()
            .id(UserId::new(row.id))
            .first_name(row.first_name)
            .last_name(row.last_name)
            .email(row.email)
            .is_active(row.is_active)
            .email_verified(row.email_verified)
            .created_at(timestamp(row.created_at)?)
            .last_login_at(last_login_at)
            .build()
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser, password_hash: &str) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Auth(AuthError::UserAlreadyExists)
            }
            e => {
                tracing::error!(error = %e, "Failed to create user");
                Error::Storage(StorageError::Database("Failed to create user".to_string()))
            }
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        row.map(User::try_from).transpose()
    }

    async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, Error> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?1")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(hash)
    }

    async fn set_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query("UPDATE users SET last_login_at = ?1, updated_at = ?1 WHERE id = ?2")
            .bind(at.timestamp())
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE(?1, first_name),
                last_name = COALESCE(?2, last_name),
                updated_at = ?3
            WHERE id = ?4
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(at.timestamp())
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to update profile");
            Error::Storage(StorageError::Database("Failed to update profile".to_string()))
        })?;

        row.map(User::try_from).transpose()
    }

    async fn set_active(
        &self,
        id: UserId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(active)
            .bind(at.timestamp())
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;

        Ok(result.rows_affected() > 0)
    }
}
