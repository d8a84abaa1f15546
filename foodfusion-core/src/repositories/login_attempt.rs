//! Repository trait for the login attempt store.
//!
//! One record per client identifier holds the consecutive failure count and
//! an optional block timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{ClientId, Error, storage::AttemptRecord};

/// Repository for per-client login attempt records.
///
/// # Concurrency
///
/// `increment` must be atomic: concurrent failures for the same client must
/// each be counted. The other operations may be plain reads and writes.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync + 'static {
    /// Load the record for a client, if any.
    async fn find(&self, client_id: &ClientId) -> Result<Option<AttemptRecord>, Error>;

    /// Count one failed attempt at `at`.
    ///
    /// Creates the record with `attempts = 1` if it does not exist, otherwise
    /// increments `attempts`. Always sets `last_attempt_at = at` and leaves
    /// `blocked_until` untouched.
    ///
    /// # Returns
    ///
    /// The record after the increment.
    async fn increment(
        &self,
        client_id: &ClientId,
        at: DateTime<Utc>,
    ) -> Result<AttemptRecord, Error>;

    /// Set the time until which the client is blocked.
    async fn set_blocked_until(
        &self,
        client_id: &ClientId,
        until: DateTime<Utc>,
    ) -> Result<(), Error>;

    /// Set `attempts` to 0 and clear `blocked_until`, keeping the record.
    async fn reset(&self, client_id: &ClientId) -> Result<(), Error>;

    /// Remove the record entirely.
    async fn delete(&self, client_id: &ClientId) -> Result<(), Error>;

    /// Delete records last touched before `before` that are not blocked at `now`.
    ///
    /// # Returns
    ///
    /// The number of records deleted.
    async fn purge_stale(&self, before: DateTime<Utc>, now: DateTime<Utc>) -> Result<u64, Error>;
}
