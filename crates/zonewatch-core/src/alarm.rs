//! Alarm state machine.
//!
//! Two inputs drive it: crossing events (alarm follows the zone: on
//! when the asset leaves, off when it returns) and explicit operator
//! overrides. Overrides set the state unconditionally and are always
//! announced, even when the value did not change, so a manual command
//! is always acknowledged downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CrossingEvent;

/// Alarm on/off state plus the timestamp of the last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmMachine {
    on: bool,
    changed_at: Option<DateTime<Utc>>,
}

/// Output of one alarm-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmOutput {
    /// Alarm state after the step.
    pub on: bool,
    /// Whether the stored value actually changed.
    pub changed: bool,
    /// Whether downstream (hub event) must be told about this step.
    pub announce: bool,
}

impl AlarmMachine {
    /// New machine, alarm off.
    pub fn new() -> Self {
        Self {
            on: false,
            changed_at: None,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Timestamp of the last state change, if any.
    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.changed_at
    }

    /// Drive the machine from a detected crossing.
    ///
    /// Announced only when the state actually flips. A crossing into
    /// the state the alarm is already in (e.g. `EnteredSafe` while
    /// off) stays silent.
    pub fn apply_crossing(&mut self, event: CrossingEvent, now: DateTime<Utc>) -> AlarmOutput {
        let target = match event {
            CrossingEvent::LeftSafe => true,
            CrossingEvent::EnteredSafe => false,
        };
        let changed = self.on != target;
        if changed {
            self.on = target;
            self.changed_at = Some(now);
        }
        AlarmOutput {
            on: self.on,
            changed,
            announce: changed,
        }
    }

    /// Apply an explicit operator override.
    ///
    /// Sets the state unconditionally and always announces.
    pub fn apply_command(&mut self, on: bool, now: DateTime<Utc>) -> AlarmOutput {
        let changed = self.on != on;
        self.on = on;
        if changed {
            self.changed_at = Some(now);
        }
        AlarmOutput {
            on,
            changed,
            announce: true,
        }
    }
}

impl Default for AlarmMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────
