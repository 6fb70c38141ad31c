//! zonewatch-core: pure geofence state machines.
//!
//! Coordinate and zone types, haversine distance, the zone classifier,
//! the edge-triggered crossing detector, and the alarm state machine.
//! No IO, no async, no system clock: every time-dependent operation
//! takes `now` as a parameter.

pub mod alarm;
pub mod classify;
pub mod crossing;
pub mod geo;
pub mod types;

pub use alarm::{AlarmMachine, AlarmOutput};
pub use classify::classify;
pub use crossing::CrossingDetector;
pub use geo::{EARTH_RADIUS_M, distance_m};
pub use types::{
    Coordinate, CrossingEvent, DEFAULT_SAFE_RADIUS_M, PositionUpdate, SafeZone, ZoneError,
    ZoneVerdict,
};
