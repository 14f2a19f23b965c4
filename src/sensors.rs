use serde::{Deserialize, Serialize};

use crate::step_fusion::{LocationProvider, OrientationProvider};
use crate::types::GpsFix;

/// Latest readings pushed by the sensor collaborators.
///
/// Answers the engine's pull queries (current fix, indoor flag, azimuth) from
/// whatever was last received.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    fix: Option<GpsFix>,
    azimuth_rad: f64,
    gps_fixes: u64,
    orientation_updates: u64,
}

impl SensorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_fix(&mut self, fix: GpsFix) {
        self.fix = Some(fix);
        self.gps_fixes += 1;
    }

    pub fn update_azimuth(&mut self, azimuth_rad: f64) {
        self.azimuth_rad = azimuth_rad;
        self.orientation_updates += 1;
    }

    pub fn is_gps_ready(&self) -> bool {
        self.fix.is_some()
    }

    pub fn gps_fix_count(&self) -> u64 {
        self.gps_fixes
    }

    pub fn orientation_update_count(&self) -> u64 {
        self.orientation_updates
    }
}

impl LocationProvider for SensorState {
    fn current_fix(&self) -> Option<GpsFix> {
        self.fix
    }
}

impl OrientationProvider for SensorState {
    fn current_azimuth(&self) -> f64 {
        self.azimuth_rad
    }
}
