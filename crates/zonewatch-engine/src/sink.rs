//! Outbound collaborator seams: notification channels and the durable
//! log.
//!
//! Implementations live in the runtime; the engine only describes what
//! must be dispatched. Delivery is best-effort, at-most-once: a sink
//! failure is logged by the caller and never rolls back the state
//! transition that produced it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use zonewatch_core::Coordinate;

use crate::event::LocationPayload;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),

    #[error("log sink io error: {0}")]
    Io(#[from] std::io::Error),
}

/// External notification channel (push, chat message).
///
/// Invoked at most once per alarm transition, never per raw update.
/// Implementations may block; callers dispatch off the ingestion path.
pub trait NotificationSink: Send + Sync {
    fn notify_zone_breach(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError>;

    fn notify_zone_restored(
        &self,
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    ) -> Result<(), SinkError>;
}

/// Durable log collaborator, invoked at the sampling cadence decided
/// by the engine's `LogPolicy`.
pub trait LogSink: Send + Sync {
    fn record(&self, snapshot: &LocationPayload) -> Result<(), SinkError>;
}

// ─── Notification Request ─────────────────────────────────────────

/// A pending notification produced by an alarm transition, carried
/// out of the engine so the caller can dispatch it off the critical
/// path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationRequest {
    Breach {
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    },
    Restored {
        position: Option<Coordinate>,
        at: DateTime<Utc>,
    },
}

impl NotificationRequest {
    /// Deliver this request to one sink.
    pub fn dispatch(&self, sink: &dyn NotificationSink) -> Result<(), SinkError> {
        match *self {
            Self::Breach { position, at } => sink.notify_zone_breach(position, at),
            Self::Restored { position, at } => sink.notify_zone_restored(position, at),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
