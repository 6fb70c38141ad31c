//! Wire event model for the live subscriber stream.
//!
//! Field names (`lat_raw`, `statusZona`, `waktu`, ...) and event names
//! (`location`, `system`, `alarm`, `camera`) are the external contract
//! consumed by dashboards and bridges; do not rename them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zonewatch_core::ZoneVerdict;

// ─── Location Payload ─────────────────────────────────────────────

/// Snapshot carried by every `location` event and by the CSV log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    pub lat_raw: Option<f64>,
    pub lon_raw: Option<f64>,
    pub lat_alt: Option<f64>,
    pub lon_alt: Option<f64>,
    #[serde(rename = "statusZona")]
    pub status_zona: ZoneVerdict,
    pub waktu: DateTime<Utc>,
}

// ─── Engine Event ─────────────────────────────────────────────────

/// One event on the fan-out stream.
///
/// Serialized as `{"event": "<name>", "data": {...}}`, one JSON
/// object per line on the subscriber wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum EngineEvent {
    /// Continuous telemetry: emitted for every ingested update.
    Location(LocationPayload),
    /// Arm/disarm state change.
    System { active: bool },
    /// Alarm state change or acknowledged override.
    Alarm { on: bool },
    /// Camera capture trigger passthrough.
    Camera { capture: bool },
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Location(_) => "location",
            Self::System { .. } => "system",
            Self::Alarm { .. } => "alarm",
            Self::Camera { .. } => "camera",
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
