use serde::{Deserialize, Serialize};

/// Latitude / longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// GPS fix as delivered by the location provider.
///
/// `is_indoor` is the provider's own indoor/outdoor classification at the
/// time the fix was produced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub coordinate: Coordinate,
    pub accuracy_m: f64,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub is_indoor: bool,
}

impl GpsFix {
    pub fn new(coordinate: Coordinate, accuracy_m: f64, timestamp_ms: i64, is_indoor: bool) -> Self {
        Self {
            coordinate,
            accuracy_m,
            timestamp_ms,
            is_indoor,
        }
    }
}

/// Position obtained by projecting a previous fused position forward by one step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeadReckonedPosition {
    pub coordinate: Coordinate,
    pub timestamp_ms: i64,
}

/// Where a displayed position came from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionSource {
    Gps { accuracy_m: f64 },
    Reckoned,
}

/// A coordinate tagged with its provenance, as handed to the display sink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coordinate: Coordinate,
    pub timestamp_ms: i64,
    pub source: PositionSource,
}

impl Position {
    pub fn is_reckoned(&self) -> bool {
        matches!(self.source, PositionSource::Reckoned)
    }
}

impl From<GpsFix> for Position {
    fn from(fix: GpsFix) -> Self {
        Self {
            coordinate: fix.coordinate,
            timestamp_ms: fix.timestamp_ms,
            source: PositionSource::Gps {
                accuracy_m: fix.accuracy_m,
            },
        }
    }
}

impl From<DeadReckonedPosition> for Position {
    fn from(reckoned: DeadReckonedPosition) -> Self {
        Self {
            coordinate: reckoned.coordinate,
            timestamp_ms: reckoned.timestamp_ms,
            source: PositionSource::Reckoned,
        }
    }
}

/// One committed history slot.
///
/// `gps_fix` is the most recent fix known when the slot was written; it may be
/// stale while indoors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusedRecord {
    pub reckoned: DeadReckonedPosition,
    pub gps_fix: GpsFix,
    pub was_indoor: bool,
}

/// Inbound sensor notifications, as recorded in replay logs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    /// First fix ever obtained by the location provider.
    GpsReady { fix: GpsFix },
    GpsFixReceived { fix: GpsFix },
    /// Compass bearing in radians, clockwise from north.
    OrientationUpdated { azimuth_rad: f64 },
    StepDetected { timestamp_ms: i64 },
}
