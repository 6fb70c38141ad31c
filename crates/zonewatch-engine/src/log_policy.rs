//! Durable-log sampling policy.
//!
//! The log collaborator is invoked on a fixed minimum wall-clock
//! interval regardless of update frequency: a sampling policy, not a
//! correctness boundary. Pure state machine; `now` is injected.

use chrono::{DateTime, TimeDelta, Utc};

/// Default minimum spacing between log records, in seconds.
pub const DEFAULT_LOG_INTERVAL_SECS: i64 = 30;

/// Decides whether a log record is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPolicy {
    interval_secs: i64,
    last_logged: Option<DateTime<Utc>>,
}

impl LogPolicy {
    pub fn new(interval_secs: i64) -> Self {
        Self {
            interval_secs,
            last_logged: None,
        }
    }

    /// Returns `true` when a record is due at `now`, marking `now` as
    /// the last log time. The very first call is always due.
    pub fn sample(&mut self, now: DateTime<Utc>) -> bool {
        let due = match self.last_logged {
            None => true,
            Some(last) => now.signed_duration_since(last) >= TimeDelta::seconds(self.interval_secs),
        };
        if due {
            self.last_logged = Some(now);
        }
        due
    }
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL_SECS)
    }
}

// ─── Tests ────────────────────────────────────────────────────────
