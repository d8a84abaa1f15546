//! Login attempt guard data types.
//!
//! | Type            | Description                                                      |
//! | --------------- | ---------------------------------------------------------------- |
//! | `AttemptRecord` | The persisted failure counter and block timestamp for one client |
//! | `BlockStatus`   | The outcome of a status check, as reported to callers            |
//! | `GuardConfig`   | Threshold, block duration and retention for the guard            |
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{ClientId, error::ValidationError};

/// One row of the attempt store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub client_id: ClientId,
    /// Consecutive failed logins since the last reset
    pub attempts: u32,
    pub last_attempt_at: DateTime<Utc>,
    /// When present and in the future, the client is blocked
    pub blocked_until: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    /// Returns `true` if the record carries a block that has not yet elapsed at `now`.
    pub fn is_blocked_at(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }
}

/// Result of checking whether a client may attempt a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockStatus {
    pub client_id: ClientId,
    pub attempts: u32,
    pub blocked: bool,
    /// Whole seconds until the block lifts, rounded up. Zero when not blocked.
    pub remaining_seconds: u64,
    pub blocked_until: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl BlockStatus {
    /// A status that permits the attempt.
    pub fn clear(client_id: ClientId, attempts: u32) -> Self {
        Self {
            client_id,
            attempts,
            blocked: false,
            remaining_seconds: 0,
            blocked_until: None,
            message: None,
        }
    }

    /// A status that denies the attempt until `blocked_until`.
    pub fn blocked(
        client_id: ClientId,
        attempts: u32,
        blocked_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let remaining_seconds = remaining_seconds(blocked_until, now);
        Self {
            client_id,
            attempts,
            blocked: true,
            remaining_seconds,
            blocked_until: Some(blocked_until),
            message: Some(format!(
                "Account temporarily locked due to multiple failed login attempts. Please try again in {}.",
                format_wait(remaining_seconds)
            )),
        }
    }
}

/// Seconds from `now` until `until`, rounded up. Zero if `until` has passed.
pub fn remaining_seconds(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (until - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis as u64).div_ceil(1000)
}

/// When a block started at `now` ends: `now + duration`, rounded up to the
/// next whole second so a store with second precision never shortens it.
///
/// `None` if the deadline is past the representable range.
pub fn block_deadline(now: DateTime<Utc>, duration: Duration) -> Option<DateTime<Utc>> {
    let until = now.checked_add_signed(duration)?;
    if until.timestamp_subsec_nanos() == 0 {
        return Some(until);
    }
    DateTime::from_timestamp(until.timestamp().checked_add(1)?, 0)
}

/// The oldest `last_attempt_at` still within `retention` of `now`.
pub fn retention_cutoff(now: DateTime<Utc>, retention: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(retention)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Render a wait time in the largest natural unit.
///
/// Minutes and hours are rounded up, so 61 seconds reads as "2 minutes".
pub fn format_wait(seconds: u64) -> String {
    let (amount, unit) = if seconds < 60 {
        (seconds, "second")
    } else if seconds < 3600 {
        (seconds.div_ceil(60), "minute")
    } else {
        (seconds.div_ceil(3600), "hour")
    };

    if amount == 1 {
        format!("{amount} {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

/// Longest block a configuration may ask for.
pub const MAX_BLOCK_DURATION: Duration = Duration::days(365);

/// Longest an idle record may be retained.
pub const MAX_RETENTION_PERIOD: Duration = Duration::days(3650);

/// Configuration for the login attempt guard.
///
/// The threshold and block duration are configuration rather than constants;
/// deployments have used both 3 and 5 failures.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// When `false`, status checks always permit and failures are not recorded
    pub enabled: bool,
    /// Failed attempts at or above which the next status check blocks the client
    pub failure_threshold: u32,
    /// How long a block lasts once triggered
    pub block_duration: Duration,
    /// Unblocked records idle for longer than this are purged by the cleanup task
    pub retention_period: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 3,
            block_duration: Duration::seconds(60),
            retention_period: Duration::days(7),
        }
    }
}

impl GuardConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_failure_threshold(mut self, failure_threshold: u32) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    pub fn with_block_duration(mut self, block_duration: Duration) -> Self {
        self.block_duration = block_duration;
        self
    }

    pub fn with_retention_period(mut self, retention_period: Duration) -> Self {
        self.retention_period = retention_period;
        self
    }

    /// Reject configurations that would block immediately or never.
    ///
    /// The block duration must be a whole number of seconds, since the
    /// attempt store keeps second precision.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.failure_threshold == 0 {
            return Err(ValidationError::InvalidField(
                "failure_threshold must be at least 1".to_string(),
            ));
        }

        if self.block_duration <= Duration::zero() {
            return Err(ValidationError::InvalidField(
                "block_duration must be positive".to_string(),
            ));
        }

        if self.block_duration.subsec_nanos() != 0 {
            return Err(ValidationError::InvalidField(
                "block_duration must be a whole number of seconds".to_string(),
            ));
        }

        if self.block_duration > MAX_BLOCK_DURATION {
            return Err(ValidationError::InvalidField(format!(
                "block_duration must be at most {} days",
                MAX_BLOCK_DURATION.num_days()
            )));
        }

        if self.retention_period <= Duration::zero() {
            return Err(ValidationError::InvalidField(
                "retention_period must be positive".to_string(),
            ));
        }

        if self.retention_period > MAX_RETENTION_PERIOD {
            return Err(ValidationError::InvalidField(format!(
                "retention_period must be at most {} days",
                MAX_RETENTION_PERIOD.num_days()
            )));
        }

        Ok(())
    }
}
