//! zonewatch-engine: the geofence event engine and its seams.
//!
//! Deterministic orchestration over the core state machines: ingest a
//! position update, classify it, edge-detect crossings, drive the
//! alarm, and describe the side effects (hub events, notifications,
//! log records) for the runtime to carry out.

pub mod engine;
pub mod event;
pub mod log_policy;
pub mod sink;

pub use engine::{Engine, IngestOutcome, MonitoringSnapshot, SystemStatus};
pub use event::{EngineEvent, LocationPayload};
pub use log_policy::{DEFAULT_LOG_INTERVAL_SECS, LogPolicy};
pub use sink::{LogSink, NotificationRequest, NotificationSink, SinkError};

pub use zonewatch_core::types;
