//! Zone classifier: membership verdict for a position against the
//! active safe zone.

use crate::geo::distance_m;
use crate::types::{Coordinate, SafeZone, ZoneVerdict};

/// Classify a position against the active zone.
///
/// `Unknown` when there is no armed zone or no usable position.
/// The boundary is inclusive: a position at exactly `radius_m` from
/// the center counts as inside, biasing the tie at the boundary away
/// from false alarms.
pub fn classify(zone: Option<&SafeZone>, position: Option<Coordinate>) -> ZoneVerdict {
    let (zone, position) = match (zone, position) {
        (Some(z), Some(p)) => (z, p),
        _ => return ZoneVerdict::Unknown,
    };

    if distance_m(zone.center, position) <= zone.radius_m {
        ZoneVerdict::Inside
    } else {
        ZoneVerdict::Outside
    }
}

// ─── Tests ────────────────────────────────────────────────────────
