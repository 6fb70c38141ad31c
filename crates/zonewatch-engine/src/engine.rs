//! Geofence event engine.
//!
//! Owns the only mutable shared state in the system: the active zone,
//! the crossing-detector memory, the alarm machine, and the latest
//! observed position. Every operation is a pure state transition that
//! returns the effects to perform (events to publish, notifications
//! to dispatch, a log record when sampling is due) so callers can run
//! the side effects off the critical path.
//!
//! Single-writer discipline: callers must serialize `ingest`,
//! `on_system_command`, and `set_alarm` (the runtime holds the engine
//! behind one mutex).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zonewatch_core::{
    AlarmMachine, Coordinate, CrossingDetector, CrossingEvent, DEFAULT_SAFE_RADIUS_M,
    PositionUpdate, SafeZone, ZoneError, ZoneVerdict, classify,
};

use crate::event::LocationPayload;
use crate::log_policy::LogPolicy;
use crate::sink::NotificationRequest;

// ─── Outcomes ─────────────────────────────────────────────────────

/// Effects produced by one ingested update.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// Latest snapshot; published as a `location` event on every
    /// update, crossing or not.
    pub snapshot: LocationPayload,
    /// The crossing edge, if one fired.
    pub crossing: Option<CrossingEvent>,
    /// `Some(on)` when an `alarm` event must be published.
    pub alarm: Option<bool>,
    /// Breach/restore notification due to the external channels.
    pub notification: Option<NotificationRequest>,
    /// Snapshot to hand to the durable log, when sampling is due.
    pub log_record: Option<LocationPayload>,
}

/// Result of an arm/disarm command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub active: bool,
    pub zone: Option<SafeZone>,
}

/// Combined read model for the `monitoring` query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSnapshot {
    /// Effective position (alternate when present, else raw).
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub lat_raw: Option<f64>,
    pub lon_raw: Option<f64>,
    pub lat_alt: Option<f64>,
    pub lon_alt: Option<f64>,
    #[serde(rename = "statusZona")]
    pub status_zona: ZoneVerdict,
    pub waktu: Option<DateTime<Utc>>,
    pub active: bool,
    pub alarm_on: bool,
    pub zone: Option<SafeZone>,
}

// ─── Engine ───────────────────────────────────────────────────────

/// The orchestrating state machine. See module docs.
#[derive(Debug)]
pub struct Engine {
    zone: Option<SafeZone>,
    detector: CrossingDetector,
    alarm: AlarmMachine,
    latest_primary: Option<Coordinate>,
    latest_alternate: Option<Coordinate>,
    latest_verdict: ZoneVerdict,
    last_seen: Option<DateTime<Utc>>,
    log_policy: LogPolicy,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_log_policy(LogPolicy::default())
    }

    pub fn with_log_policy(log_policy: LogPolicy) -> Self {
        Self {
            zone: None,
            detector: CrossingDetector::new(),
            alarm: AlarmMachine::new(),
            latest_primary: None,
            latest_alternate: None,
            latest_verdict: ZoneVerdict::Unknown,
            last_seen: None,
            log_policy,
        }
    }

    pub fn zone(&self) -> Option<&SafeZone> {
        self.zone.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.zone.is_some()
    }

    pub fn alarm_on(&self) -> bool {
        self.alarm.is_on()
    }

    /// Ingest one position update.
    ///
    /// Never fails: unusable coordinates classify as `Unknown` and the
    /// last-seen bookkeeping still advances. `now` is the wall clock
    /// (drives alarm transition timestamps and log sampling);
    /// `update.timestamp` is the telemetry time carried on the wire.
    pub fn ingest(&mut self, update: PositionUpdate, now: DateTime<Utc>) -> IngestOutcome {
        self.latest_primary = update.primary;
        self.latest_alternate = update.alternate;
        self.last_seen = Some(update.timestamp);

        let effective = update.effective();
        let verdict = classify(self.zone.as_ref(), effective);
        self.latest_verdict = verdict;

        let crossing = self.detector.observe(verdict);

        let mut alarm = None;
        let mut notification = None;
        if let Some(event) = crossing {
            let out = self.alarm.apply_crossing(event, now);
            if out.announce {
                alarm = Some(out.on);
                notification = Some(match event {
                    CrossingEvent::LeftSafe => NotificationRequest::Breach {
                        position: effective,
                        at: update.timestamp,
                    },
                    CrossingEvent::EnteredSafe => NotificationRequest::Restored {
                        position: effective,
                        at: update.timestamp,
                    },
                });
            }
        }

        let snapshot = self.location_payload(update.timestamp);
        let log_record = self.log_policy.sample(now).then_some(snapshot);

        IngestOutcome {
            snapshot,
            crossing,
            alarm,
            notification,
            log_record,
        }
    }

    /// Arm or disarm the system.
    ///
    /// Arming without a usable center falls back to the asset's last
    /// known raw position; with no fallback available the command is
    /// rejected and nothing changes. Both directions reset the
    /// crossing memory, so the first post-arm update cannot inherit a
    /// stale edge.
    pub fn on_system_command(
        &mut self,
        active: bool,
        center: Option<Coordinate>,
        radius_m: Option<f64>,
    ) -> Result<SystemStatus, ZoneError> {
        if active {
            let center = match center {
                Some(c) => c,
                None => self.latest_primary.ok_or(ZoneError::NoZoneCenter)?,
            };
            let radius = radius_m.unwrap_or(DEFAULT_SAFE_RADIUS_M);
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ZoneError::InvalidRadius(radius));
            }
            self.zone = Some(SafeZone::new(center, radius));
        } else {
            self.zone = None;
        }
        self.detector.reset();

        Ok(SystemStatus {
            active,
            zone: self.zone,
        })
    }

    /// Apply an explicit alarm override.
    ///
    /// Always announced (returns the value to publish), and resets the
    /// crossing memory so the stored verdict cannot immediately undo
    /// the override on the next update.
    pub fn set_alarm(&mut self, on: bool, now: DateTime<Utc>) -> bool {
        let out = self.alarm.apply_command(on, now);
        self.detector.reset();
        out.on
    }

    /// Combined read model for status queries.
    pub fn monitoring(&self) -> MonitoringSnapshot {
        let effective = self.latest_alternate.or(self.latest_primary);
        MonitoringSnapshot {
            latitude: effective.map(|c| c.lat),
            longitude: effective.map(|c| c.lon),
            lat_raw: self.latest_primary.map(|c| c.lat),
            lon_raw: self.latest_primary.map(|c| c.lon),
            lat_alt: self.latest_alternate.map(|c| c.lat),
            lon_alt: self.latest_alternate.map(|c| c.lon),
            status_zona: self.latest_verdict,
            waktu: self.last_seen,
            active: self.zone.is_some(),
            alarm_on: self.alarm.is_on(),
            zone: self.zone,
        }
    }

    fn location_payload(&self, waktu: DateTime<Utc>) -> LocationPayload {
        LocationPayload {
            lat_raw: self.latest_primary.map(|c| c.lat),
            lon_raw: self.latest_primary.map(|c| c.lon),
            lat_alt: self.latest_alternate.map(|c| c.lat),
            lon_alt: self.latest_alternate.map(|c| c.lon),
            status_zona: self.latest_verdict,
            waktu,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────
