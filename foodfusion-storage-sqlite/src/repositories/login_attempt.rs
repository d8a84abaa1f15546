//! SQLite implementation of the login attempt repository.
//!
//! Timestamps are stored as unix seconds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodfusion_core::{
    ClientId, Error, error::StorageError, repositories::LoginAttemptRepository,
    storage::AttemptRecord,
};
use sqlx::SqlitePool;

use super::timestamp;

/// SQLite repository for login attempt records.
pub struct SqliteLoginAttemptRepository {
    pool: SqlitePool,
}

impl SqliteLoginAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteAttemptRecord {
    client_id: String,
    attempts: i64,
    last_attempt_at: i64,
    blocked_until: Option<i64>,
}

impl TryFrom<SqliteAttemptRecord> for AttemptRecord {
    type Error = Error;

    fn try_from(row: SqliteAttemptRecord) -> Result<Self, Self::Error> {
        let blocked_until = match row.blocked_until {
            Some(ts) => Some(timestamp(ts)?),
            None => None,
        };

        Ok(AttemptRecord {
            client_id: ClientId::new(&row.client_id)?,
            attempts: u32::try_from(row.attempts).map_err(|_| {
                StorageError::Database(format!("Invalid attempt count: {}", row.attempts))
            })?,
            last_attempt_at: timestamp(row.last_attempt_at)?,
            blocked_until,
        })
    }
}

#[async_trait]
impl LoginAttemptRepository for SqliteLoginAttemptRepository {
    async fn find(&self, client_id: &ClientId) -> Result<Option<AttemptRecord>, Error> {
        let row = sqlx::query_as::<_, SqliteAttemptRecord>(
            r#"
            SELECT client_id, attempts, last_attempt_at, blocked_until
            FROM login_attempts
            WHERE client_id = ?
            "#,
        )
        .bind(client_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load login attempts");
            StorageError::Database("Failed to load login attempts".to_string())
        })?;

        row.map(AttemptRecord::try_from).transpose()
    }

    async fn increment(
        &self,
        client_id: &ClientId,
        at: DateTime<Utc>,
    ) -> Result<AttemptRecord, Error> {
        let row = sqlx::query_as::<_, SqliteAttemptRecord>(
            r#"
            INSERT INTO login_attempts (client_id, attempts, last_attempt_at, blocked_until)
            VALUES (?1, 1, ?2, NULL)
            ON CONFLICT(client_id) DO UPDATE SET
                attempts = attempts + 1,
                last_attempt_at = excluded.last_attempt_at
            RETURNING client_id, attempts, last_attempt_at, blocked_until
            "#,
        )
        .bind(client_id.as_str())
        .bind(at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record failed login attempt");
            StorageError::Database("Failed to record failed login attempt".to_string())
        })?;

        row.try_into()
    }

    async fn set_blocked_until(
        &self,
        client_id: &ClientId,
        until: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE login_attempts SET blocked_until = ? WHERE client_id = ?")
            .bind(until.timestamp())
            .bind(client_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to set blocked_until");
                StorageError::Database("Failed to set blocked_until".to_string())
            })?;

        Ok(())
    }

    async fn reset(&self, client_id: &ClientId) -> Result<(), Error> {
        sqlx::query(
            "UPDATE login_attempts SET attempts = 0, blocked_until = NULL WHERE client_id = ?",
        )
        .bind(client_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to reset login attempts");
            StorageError::Database("Failed to reset login attempts".to_string())
        })?;

        Ok(())
    }

    async fn delete(&self, client_id: &ClientId) -> Result<(), Error> {
        sqlx::query("DELETE FROM login_attempts WHERE client_id = ?")
            .bind(client_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to clear login attempts");
                StorageError::Database("Failed to clear login attempts".to_string())
            })?;

        Ok(())
    }

    async fn purge_stale(&self, before: DateTime<Utc>, now: DateTime<Utc>) -> Result<u64, Error> {
        // Never purge an active block
        let result = sqlx::query(
            r#"
            DELETE FROM login_attempts
            WHERE last_attempt_at < ?
            AND (blocked_until IS NULL OR blocked_until <= ?)
            "#,
        )
        .bind(before.timestamp())
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to purge stale login attempts");
            StorageError::Database("Failed to purge stale login attempts".to_string())
        })?;

        Ok(result.rows_affected())
    }
}
