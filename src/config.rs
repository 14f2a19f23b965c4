use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FusionError, FusionResult};

// ─── Collaborator knobs ──────────────────────────────────────────────────────

/// Thresholds owned by the sensor collaborators (indoor classifier, step detector).
///
/// The engine only stores and validates them so a settings surface has one
/// place to read and write them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorThresholds {
    /// Fix accuracy (m) above which the classifier switches to indoor.
    pub outdoor_to_indoor: f64,
    /// Fix accuracy (m) below which the classifier switches back to outdoor.
    pub indoor_to_outdoor: f64,
    /// Accelerometer velocity threshold of the step detector.
    pub velocity_threshold: f64,
}

impl Default for SensorThresholds {
    fn default() -> Self {
        Self {
            outdoor_to_indoor: 20.0,
            indoor_to_outdoor: 10.0,
            velocity_threshold: 1.5,
        }
    }
}

// ─── Engine configuration ────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    // ── History ──
    pub history_capacity: usize,
    pub reset_interval: usize,

    // ── Step length ──
    pub step_length_m: f64,

    // ── Calibration window ──
    pub min_step_calibration: u32,
    pub max_step_calibration: u32,
    pub calibration_time_threshold_ms: i64,
    pub calibration_accuracy_threshold_m: f64,

    pub thresholds: SensorThresholds,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            reset_interval: 10,
            step_length_m: 0.75,
            min_step_calibration: 20,
            max_step_calibration: 50,
            calibration_time_threshold_ms: 10,
            calibration_accuracy_threshold_m: 10.0,
            thresholds: SensorThresholds::default(),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> FusionResult<()> {
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be at least 1"));
        }
        if self.reset_interval == 0 {
            return Err(invalid("reset_interval must be at least 1"));
        }
        if self.min_step_calibration == 0 {
            return Err(invalid("min_step_calibration must be at least 1"));
        }
        if self.min_step_calibration > self.max_step_calibration {
            return Err(FusionError::InvalidConfig(format!(
                "min_step_calibration ({}) exceeds max_step_calibration ({})",
                self.min_step_calibration, self.max_step_calibration
            )));
        }
        // The anchor slot must not be overwritten while its window is open.
        if self.history_capacity <= self.max_step_calibration as usize {
            return Err(FusionError::InvalidConfig(format!(
                "history_capacity ({}) must exceed max_step_calibration ({})",
                self.history_capacity, self.max_step_calibration
            )));
        }
        if self.calibration_time_threshold_ms < 0 {
            return Err(invalid("calibration_time_threshold_ms must not be negative"));
        }
        positive("step_length_m", self.step_length_m)?;
        positive("calibration_accuracy_threshold_m", self.calibration_accuracy_threshold_m)?;
        positive("thresholds.outdoor_to_indoor", self.thresholds.outdoor_to_indoor)?;
        positive("thresholds.indoor_to_outdoor", self.thresholds.indoor_to_outdoor)?;
        positive("thresholds.velocity_threshold", self.thresholds.velocity_threshold)?;
        Ok(())
    }

    /// Parse a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> FusionResult<Self> {
        let config: FusionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> FusionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

fn invalid(message: &str) -> FusionError {
    FusionError::InvalidConfig(message.to_string())
}

fn positive(name: &str, value: f64) -> FusionResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FusionError::InvalidConfig(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}
