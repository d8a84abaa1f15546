//! Login attempt guard keyed by client identifier.
//!
//! Failed logins are counted per client (usually an IP address). Once the count
//! reaches the configured threshold, the next status check blocks the client for
//! the configured duration. A status check that finds an elapsed block resets
//! the counter, and a successful login deletes the record.
//!
//! # State per client
//!
//! | From           | Event                                 | To             |
//! | -------------- | ------------------------------------- | -------------- |
//! | `CLEAR`        | failed login                          | `ACCUMULATING` |
//! | `ACCUMULATING` | failed login                          | `ACCUMULATING` |
//! | `ACCUMULATING` | status check with attempts >= limit   | `BLOCKED`      |
//! | `BLOCKED`      | status check after `blocked_until`    | `CLEAR`        |
//! | any            | successful login                      | `CLEAR`        |
//!
//! # Example
//!
//! ```rust,ignore
//! use foodfusion_core::services::LoginAttemptGuard;
//! use foodfusion_core::storage::GuardConfig;
//!
//! let guard = LoginAttemptGuard::new(repository, GuardConfig::default());
//!
//! let status = guard.check_status(&client_id).await?;
//! if status.blocked {
//!     // Reject with status.message
//! }
//!
//! // After a failed authentication
//! guard.record_failure(&client_id).await?;
//! ```

use std::sync::Arc;

use crate::{
    ClientId, Error,
    clock::{Clock, SystemClock},
    error::ValidationError,
    repositories::LoginAttemptRepository,
    storage::{BlockStatus, GuardConfig, block_deadline, retention_cutoff},
};

/// Purge interval for the background cleanup task.
const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Decides whether a client may attempt a login.
///
/// All state lives in the repository, so the guard can be shared freely
/// across tasks.
pub struct LoginAttemptGuard<R: LoginAttemptRepository> {
    repository: Arc<R>,
    config: GuardConfig,
    clock: Arc<dyn Clock>,
}

impl<R: LoginAttemptRepository> LoginAttemptGuard<R> {
    /// Create a guard that reads the system time.
    pub fn new(repository: Arc<R>, config: GuardConfig) -> Self {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    /// Create a guard with an explicit time source.
    pub fn with_clock(repository: Arc<R>, config: GuardConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Decide whether `client_id` may attempt a login now.
    ///
    /// Besides reading, this is where blocks start and end: a record at or over
    /// the threshold without a block gets one, and a record whose block has
    /// elapsed is reset. Calling it repeatedly never increases the count.
    pub async fn check_status(&self, client_id: &ClientId) -> Result<BlockStatus, Error> {
        if !self.config.enabled {
            return Ok(BlockStatus::clear(client_id.clone(), 0));
        }

        let now = self.clock.now();
        let Some(record) = self.repository.find(client_id).await? else {
            return Ok(BlockStatus::clear(client_id.clone(), 0));
        };

        match record.blocked_until {
            Some(until) if until <= now => {
                self.repository.reset(client_id).await?;
                tracing::info!(client_id = %client_id, "Login block expired");
                Ok(BlockStatus::clear(client_id.clone(), 0))
            }
            Some(until) => Ok(BlockStatus::blocked(
                client_id.clone(),
                record.attempts,
                until,
                now,
            )),
            None if record.attempts >= self.config.failure_threshold => {
                let until = block_deadline(now, self.config.block_duration).ok_or_else(|| {
                    ValidationError::InvalidField("block_duration is out of range".to_string())
                })?;
                self.repository.set_blocked_until(client_id, until).await?;
                tracing::warn!(
                    client_id = %client_id,
                    attempts = record.attempts,
                    blocked_until = %until,
                    "Client blocked after repeated failed logins"
                );
                Ok(BlockStatus::blocked(
                    client_id.clone(),
                    record.attempts,
                    until,
                    now,
                ))
            }
            None => Ok(BlockStatus::clear(client_id.clone(), record.attempts)),
        }
    }

    /// Report the current block without changing any state.
    pub async fn block_status(&self, client_id: &ClientId) -> Result<BlockStatus, Error> {
        if !self.config.enabled {
            return Ok(BlockStatus::clear(client_id.clone(), 0));
        }

        let now = self.clock.now();
        let status = match self.repository.find(client_id).await? {
            Some(record) => match record.blocked_until {
                Some(until) if until > now => {
                    BlockStatus::blocked(client_id.clone(), record.attempts, until, now)
                }
                Some(_) => BlockStatus::clear(client_id.clone(), 0),
                None => BlockStatus::clear(client_id.clone(), record.attempts),
            },
            None => BlockStatus::clear(client_id.clone(), 0),
        };

        Ok(status)
    }

    /// Count a failed login for `client_id`.
    ///
    /// This only increments; whether the client is now blocked is decided by the
    /// next [`check_status`](Self::check_status).
    pub async fn record_failure(&self, client_id: &ClientId) -> Result<(), Error> {
        if !self.config.enabled {
            return Ok(());
        }

        let record = self
            .repository
            .increment(client_id, self.clock.now())
            .await?;
        tracing::debug!(
            client_id = %client_id,
            attempts = record.attempts,
            "Recorded failed login"
        );

        Ok(())
    }

    /// Forget all failures for `client_id`. Called after a successful login.
    pub async fn clear_attempts(&self, client_id: &ClientId) -> Result<(), Error> {
        self.repository.delete(client_id).await
    }

    /// Delete unblocked records idle for longer than the retention period.
    ///
    /// # Returns
    ///
    /// The number of records deleted.
    pub async fn purge_stale(&self) -> Result<u64, Error> {
        let now = self.clock.now();
        self.repository
            .purge_stale(retention_cutoff(now, self.config.retention_period), now)
            .await
    }

    /// Start the background cleanup task.
    ///
    /// Runs [`purge_stale`](Self::purge_stale) hourly until `shutdown` changes.
    /// Runs even when the guard is disabled so that records left from an
    /// earlier enabled deployment are still purged.
    pub fn start_cleanup_task(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let clock = Arc::clone(&self.clock);
        let retention = self.config.retention_period;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(CLEANUP_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let now = clock.now();
                        match repository.purge_stale(retention_cutoff(now, retention), now).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(
                                    count = count,
                                    "Purged stale login attempt records"
                                );
                            }
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    "Failed to purge stale login attempt records"
                                );
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down login attempt cleanup task");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::services::testing::{FailingLoginAttemptRepository, MockLoginAttemptRepository};
    use chrono::{DateTime, Duration};

    fn start() -> DateTime<chrono::Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn client(id: &str) -> ClientId {
        ClientId::new(id).unwrap()
    }

    fn guard_with(
        config: GuardConfig,
    ) -> (
        LoginAttemptGuard<MockLoginAttemptRepository>,
        Arc<MockLoginAttemptRepository>,
        Arc<ManualClock>,
    ) {
        let repo = Arc::new(MockLoginAttemptRepository::default());
        let clock = Arc::new(ManualClock::new(start()));
        let guard = LoginAttemptGuard::with_clock(repo.clone(), config, clock.clone());
        (guard, repo, clock)
    }

    #[tokio::test]
    async fn test_unknown_client_is_clear() {
        let (guard, _, _) = guard_with(GuardConfig::default());

        let status = guard.check_status(&client("1.2.3.4")).await.unwrap();
        assert!(!status.blocked);
        assert_eq!(status.attempts, 0);
        assert_eq!(status.remaining_seconds, 0);
        assert!(status.message.is_none());
    }

    #[tokio::test]
    async fn test_below_threshold_is_clear() {
        let (guard, _, _) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..2 {
            guard.record_failure(&id).await.unwrap();
        }

        let status = guard.check_status(&id).await.unwrap();
        assert!(!status.blocked);
        assert_eq!(status.attempts, 2);
    }

    #[tokio::test]
    async fn test_threshold_blocks_for_block_duration() {
        let (guard, repo, clock) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }

        let status = guard.check_status(&id).await.unwrap();
        assert!(status.blocked);
        assert_eq!(status.attempts, 3);
        assert_eq!(status.remaining_seconds, 60);
        assert_eq!(status.blocked_until, Some(clock.now() + Duration::seconds(60)));
        assert_eq!(
            status.message.as_deref(),
            Some(
                "Account temporarily locked due to multiple failed login attempts. Please try again in 1 minute."
            )
        );

        let record = repo.get(&id).unwrap();
        assert_eq!(record.blocked_until, status.blocked_until);
    }

    #[tokio::test]
    async fn test_remaining_time_decreases_then_block_lifts() {
        let (guard, repo, clock) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }
        assert_eq!(guard.check_status(&id).await.unwrap().remaining_seconds, 60);

        clock.advance(Duration::seconds(15));
        let status = guard.check_status(&id).await.unwrap();
        assert!(status.blocked);
        assert_eq!(status.remaining_seconds, 45);
        assert_eq!(
            status.message.as_deref(),
            Some(
                "Account temporarily locked due to multiple failed login attempts. Please try again in 45 seconds."
            )
        );

        clock.advance(Duration::seconds(46));
        let status = guard.check_status(&id).await.unwrap();
        assert!(!status.blocked);
        assert_eq!(status.attempts, 0);

        // The row is kept but reset
        let record = repo.get(&id).unwrap();
        assert_eq!(record.attempts, 0);
        assert!(record.blocked_until.is_none());
    }

    #[tokio::test]
    async fn test_block_lifts_exactly_at_blocked_until() {
        let (guard, _, clock) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }
        guard.check_status(&id).await.unwrap();

        clock.advance(Duration::seconds(60));
        assert!(!guard.check_status(&id).await.unwrap().blocked);
    }

    #[tokio::test]
    async fn test_block_started_mid_second_ends_on_whole_second() {
        let (guard, repo, clock) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }
        clock.advance(Duration::milliseconds(400));
        let status = guard.check_status(&id).await.unwrap();

        let until = start() + Duration::seconds(61);
        assert_eq!(status.blocked_until, Some(until));
        assert_eq!(repo.get(&id).unwrap().blocked_until, Some(until));
        assert_eq!(status.remaining_seconds, 61);

        clock.set(start() + Duration::seconds(60) + Duration::milliseconds(500));
        assert!(guard.check_status(&id).await.unwrap().blocked);
    }

    #[tokio::test]
    async fn test_unrepresentable_block_is_an_error() {
        let config = GuardConfig::default().with_block_duration(Duration::seconds(9_000_000_000_000));
        let (guard, repo, _) = guard_with(config);
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }

        let err = guard.check_status(&id).await.unwrap_err();
        assert!(err.is_validation_error());
        assert!(repo.get(&id).unwrap().blocked_until.is_none());
    }

    #[tokio::test]
    async fn test_repeated_checks_do_not_count() {
        let (guard, repo, _) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        guard.record_failure(&id).await.unwrap();
        for _ in 0..10 {
            assert!(!guard.check_status(&id).await.unwrap().blocked);
        }
        assert_eq!(repo.get(&id).unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn test_repeated_checks_while_blocked_keep_the_same_deadline() {
        let (guard, _, clock) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }
        let first = guard.check_status(&id).await.unwrap();
        clock.advance(Duration::seconds(5));
        let second = guard.check_status(&id).await.unwrap();

        assert_eq!(first.blocked_until, second.blocked_until);
        assert_eq!(second.remaining_seconds, 55);
    }

    #[tokio::test]
    async fn test_clear_attempts_resets_sequence() {
        let (guard, repo, _) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        guard.record_failure(&id).await.unwrap();
        guard.clear_attempts(&id).await.unwrap();

        let status = guard.check_status(&id).await.unwrap();
        assert!(!status.blocked);
        assert!(repo.get(&id).is_none());

        guard.record_failure(&id).await.unwrap();
        assert_eq!(repo.get(&id).unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn test_clear_attempts_lifts_active_block() {
        let (guard, _, _) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }
        assert!(guard.check_status(&id).await.unwrap().blocked);

        guard.clear_attempts(&id).await.unwrap();
        assert!(!guard.check_status(&id).await.unwrap().blocked);
    }

    #[tokio::test]
    async fn test_clients_tracked_separately() {
        let (guard, _, _) = guard_with(GuardConfig::default());
        let a = client("1.1.1.1");
        let b = client("2.2.2.2");

        for _ in 0..3 {
            guard.record_failure(&a).await.unwrap();
        }
        guard.record_failure(&b).await.unwrap();

        assert!(guard.check_status(&a).await.unwrap().blocked);
        let status = guard.check_status(&b).await.unwrap();
        assert!(!status.blocked);
        assert_eq!(status.attempts, 1);
    }

    #[tokio::test]
    async fn test_configurable_threshold_and_duration() {
        let config = GuardConfig::default()
            .with_failure_threshold(5)
            .with_block_duration(Duration::minutes(15));
        let (guard, _, _) = guard_with(config);
        let id = client("1.2.3.4");

        for _ in 0..4 {
            guard.record_failure(&id).await.unwrap();
        }
        assert!(!guard.check_status(&id).await.unwrap().blocked);

        guard.record_failure(&id).await.unwrap();
        let status = guard.check_status(&id).await.unwrap();
        assert!(status.blocked);
        assert_eq!(status.remaining_seconds, 900);
        assert!(status.message.unwrap().ends_with("Please try again in 15 minutes."));
    }

    #[tokio::test]
    async fn test_disabled_guard_never_blocks_or_records() {
        let (guard, repo, _) = guard_with(GuardConfig::disabled());
        let id = client("1.2.3.4");

        for _ in 0..10 {
            guard.record_failure(&id).await.unwrap();
        }
        assert!(!guard.check_status(&id).await.unwrap().blocked);
        assert!(repo.get(&id).is_none());
        assert!(!guard.is_enabled());
    }

    #[tokio::test]
    async fn test_block_status_does_not_write() {
        let (guard, repo, clock) = guard_with(GuardConfig::default());
        let id = client("1.2.3.4");

        for _ in 0..3 {
            guard.record_failure(&id).await.unwrap();
        }

        // Threshold reached but no check has activated the block yet
        let status = guard.block_status(&id).await.unwrap();
        assert!(!status.blocked);
        assert!(repo.get(&id).unwrap().blocked_until.is_none());

        guard.check_status(&id).await.unwrap();
        clock.advance(Duration::seconds(30));
        let status = guard.block_status(&id).await.unwrap();
        assert!(status.blocked);
        assert_eq!(status.remaining_seconds, 30);

        clock.advance(Duration::seconds(31));
        let status = guard.block_status(&id).await.unwrap();
        assert!(!status.blocked);
        // Expired block is still stored until a check resets it
        assert!(repo.get(&id).unwrap().blocked_until.is_some());
    }

    #[tokio::test]
    async fn test_purge_stale_uses_retention_period() {
        let config = GuardConfig::default().with_retention_period(Duration::days(1));
        let (guard, repo, clock) = guard_with(config);
        let old = client("1.1.1.1");
        let fresh = client("2.2.2.2");

        guard.record_failure(&old).await.unwrap();
        clock.advance(Duration::hours(23));
        guard.record_failure(&fresh).await.unwrap();
        clock.advance(Duration::hours(2));

        assert_eq!(guard.purge_stale().await.unwrap(), 1);
        assert!(repo.get(&old).is_none());
        assert!(repo.get(&fresh).is_some());
    }

    #[tokio::test]
    async fn test_store_errors_are_returned() {
        let guard = LoginAttemptGuard::new(
            Arc::new(FailingLoginAttemptRepository),
            GuardConfig::default(),
        );
        let id = client("1.2.3.4");

        assert!(guard.check_status(&id).await.unwrap_err().is_storage_error());
        assert!(guard.record_failure(&id).await.unwrap_err().is_storage_error());
        assert!(guard.clear_attempts(&id).await.unwrap_err().is_storage_error());
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_shutdown() {
        let (guard, _, _) = guard_with(GuardConfig::default());
        let (tx, rx) = tokio::sync::watch::channel(false);

        let handle = guard.start_cleanup_task(rx);
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("cleanup task did not stop")
            .unwrap();
    }
}
