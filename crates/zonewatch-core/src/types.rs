use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Coordinate ───────────────────────────────────────────────────

/// A WGS-84 position in decimal degrees.
///
/// No range validation is performed, only finiteness. Out-of-range
/// degree values are accepted as-is, matching what tracker hardware
/// actually emits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Construct only when both components are finite numbers.
    pub fn finite(lat: f64, lon: f64) -> Option<Self> {
        if lat.is_finite() && lon.is_finite() {
            Some(Self { lat, lon })
        } else {
            None
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

// ─── Safe Zone ────────────────────────────────────────────────────

/// Default safe-zone radius in meters when the arm command does not
/// specify one.
pub const DEFAULT_SAFE_RADIUS_M: f64 = 20.0;

/// Operator-defined circular geofence.
///
/// Replace-on-write: a zone is never mutated after construction.
/// Re-arming installs a fresh value so concurrent readers only ever
/// observe a complete zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl SafeZone {
    pub fn new(center: Coordinate, radius_m: f64) -> Self {
        Self { center, radius_m }
    }
}

// ─── Position Update ──────────────────────────────────────────────

/// One telemetry sample from the tracked asset.
///
/// `alternate` is a refined position (e.g. filter output) and takes
/// precedence over `primary` for zone classification when present.
/// The engine keeps only the most recent sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub primary: Option<Coordinate>,
    pub alternate: Option<Coordinate>,
    pub timestamp: DateTime<Utc>,
}

impl PositionUpdate {
    /// The position used for classification: alternate wins when set.
    pub fn effective(&self) -> Option<Coordinate> {
        self.alternate.or(self.primary)
    }
}

// ─── Zone Verdict ─────────────────────────────────────────────────

/// Classification of the asset relative to the safe zone.
///
/// The string forms are the wire labels carried by `statusZona`
/// payload fields and the CSV log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneVerdict {
    #[default]
    #[serde(rename = "Tidak Diketahui")]
    Unknown,
    #[serde(rename = "Aman")]
    Inside,
    #[serde(rename = "Bahaya")]
    Outside,
}

impl ZoneVerdict {
    pub const ALL: [Self; 3] = [Self::Unknown, Self::Inside, Self::Outside];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Tidak Diketahui",
            Self::Inside => "Aman",
            Self::Outside => "Bahaya",
        }
    }
}

impl fmt::Display for ZoneVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneVerdict {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tidak Diketahui" => Ok(Self::Unknown),
            "Aman" => Ok(Self::Inside),
            "Bahaya" => Ok(Self::Outside),
            _ => Err(ZoneError::InvalidVerdict(s.to_owned())),
        }
    }
}

// ─── Crossing Event ───────────────────────────────────────────────

/// Edge-triggered zone-crossing transition. The only occasions that
/// drive alarm changes and breach/restore notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingEvent {
    EnteredSafe,
    LeftSafe,
}

impl CrossingEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnteredSafe => "entered_safe",
            Self::LeftSafe => "left_safe",
        }
    }
}

impl fmt::Display for CrossingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Error ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneError {
    /// A coordinate pair was supplied but is not usable (non-finite).
    InvalidCoordinate(String),
    /// Arm requested without usable coordinates and no last-known
    /// position to fall back on.
    NoZoneCenter,
    /// Zone radius is non-finite or not positive.
    InvalidRadius(f64),
    /// Unrecognized verdict wire label.
    InvalidVerdict(String),
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate(msg) => write!(f, "invalid coordinate: {msg}"),
            Self::NoZoneCenter => write!(
                f,
                "zone center required: supply lat/lon or wait for the asset to report a position"
            ),
            Self::InvalidRadius(r) => write!(f, "invalid zone radius: {r}"),
            Self::InvalidVerdict(s) => write!(f, "unknown zone verdict: {s}"),
        }
    }
}

impl std::error::Error for ZoneError {}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn coordinate_finite_rejects_nan_and_inf() {
        assert!(Coordinate::finite(f64::NAN, 106.8).is_none());
        assert!(Coordinate::finite(-6.2, f64::INFINITY).is_none());
        assert!(Coordinate::finite(-6.2, 106.8).is_some());
    }

    #[test]
    fn coordinate_finite_accepts_out_of_range_degrees() {
        // Tolerated on purpose: only finiteness is checked.
        assert!(Coordinate::finite(123.0, 456.0).is_some());
    }

    #[test]
    fn verdict_serde_uses_wire_labels() {
        for v in ZoneVerdict::ALL {
            let json = serde_json::to_string(&v).expect("serialize");
            assert_eq!(json, format!("\"{}\"", v.as_str()));
            let back: ZoneVerdict = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(v, back);
        }
    }

    #[test]
    fn verdict_display_and_parse() {
        for v in ZoneVerdict::ALL {
            let s = v.to_string();
            let parsed = s.parse::<ZoneVerdict>().expect("parse");
            assert_eq!(v, parsed);
        }
        assert!("Elsewhere".parse::<ZoneVerdict>().is_err());
    }

    #[test]
    fn verdict_default_is_unknown() {
        assert_eq!(ZoneVerdict::default(), ZoneVerdict::Unknown);
    }

    #[test]
    fn effective_position_prefers_alternate() {
        let update = PositionUpdate {
            primary: Coordinate::finite(-6.2, 106.8),
            alternate: Coordinate::finite(-6.3, 106.9),
            timestamp: Utc::now(),
        };
        assert_eq!(update.effective(), update.alternate);
    }

    #[test]
    fn effective_position_falls_back_to_primary() {
        let update = PositionUpdate {
            primary: Coordinate::finite(-6.2, 106.8),
            alternate: None,
            timestamp: Utc::now(),
        };
        assert_eq!(update.effective(), update.primary);
    }

    #[test]
    fn effective_position_none_when_both_missing() {
        let update = PositionUpdate {
            primary: None,
            alternate: None,
            timestamp: Utc::now(),
        };
        assert!(update.effective().is_none());
    }

    #[test]
    fn error_display() {
        let err = ZoneError::InvalidCoordinate("lat=NaN".into());
        assert!(err.to_string().contains("lat=NaN"));
        assert!(ZoneError::NoZoneCenter.to_string().contains("zone center"));
    }
}
