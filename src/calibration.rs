//! Online step-length calibration.
//!
//! Watches committed history records. A record whose paired GPS fix is both
//! fresh and accurate opens a window (the anchor); once between
//! `min_step_calibration` and `max_step_calibration` records have been
//! observed, the next qualifying record closes it and the step length becomes
//! the anchor-to-fix great-circle distance divided by the sample count. A
//! window that overruns `max_step_calibration` is either re-anchored on the
//! current record (if it qualifies) or dropped.

use serde::{Deserialize, Serialize};

use crate::config::FusionConfig;
use crate::geodesy::great_circle_distance;
use crate::history::{HistoryIndex, PositionHistory};
use crate::types::FusedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationPhase {
    /// No anchor chosen
    Unanchored,
    /// Anchor chosen, counting steps
    Accumulating,
    /// A step length has been estimated
    Calibrated,
}

/// What a single observation did to the calibration state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    /// Nothing to do: unanchored and the record does not qualify.
    Idle,
    Anchored { index: HistoryIndex },
    /// Window still open; either too early or the record does not qualify.
    Waiting { sample_count: u32 },
    Converged { step_length_m: f64, distance_m: f64, sample_count: u32 },
    /// Window overran with a qualifying record; it becomes the new anchor.
    Reanchored { index: HistoryIndex },
    /// Window overran without a qualifying record.
    Abandoned { sample_count: u32 },
}

#[derive(Debug, Clone)]
pub struct Calibrator {
    anchor: Option<HistoryIndex>,
    sample_count: u32,
    step_length_m: f64,
    is_calibrated: bool,

    min_steps: u32,
    max_steps: u32,
    time_threshold_ms: i64,
    accuracy_threshold_m: f64,
}

impl Calibrator {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            anchor: None,
            sample_count: 0,
            step_length_m: config.step_length_m,
            is_calibrated: false,
            min_steps: config.min_step_calibration,
            max_steps: config.max_step_calibration,
            time_threshold_ms: config.calibration_time_threshold_ms,
            accuracy_threshold_m: config.calibration_accuracy_threshold_m,
        }
    }

    /// Refresh thresholds from `config`. The running window is kept.
    pub fn apply_thresholds(&mut self, config: &FusionConfig) {
        self.min_steps = config.min_step_calibration;
        self.max_steps = config.max_step_calibration;
        self.time_threshold_ms = config.calibration_time_threshold_ms;
        self.accuracy_threshold_m = config.calibration_accuracy_threshold_m;
    }

    /// Fix is no later than `time_threshold_ms` after its step and accurate
    /// enough to measure distance with. Fixes older than the step qualify.
    pub fn is_qualifying(&self, record: &FusedRecord) -> bool {
        let offset = record.gps_fix.timestamp_ms.saturating_sub(record.reckoned.timestamp_ms);
        offset <= self.time_threshold_ms && record.gps_fix.accuracy_m <= self.accuracy_threshold_m
    }

    /// Feed the record just committed at `index`.
    pub fn observe(&mut self, history: &PositionHistory, index: HistoryIndex) -> CalibrationOutcome {
        let Some(record) = history.at(index) else {
            return CalibrationOutcome::Idle;
        };

        if self.sample_count > 0 {
            self.sample_count += 1;
        }
        let qualifying = self.is_qualifying(record);

        let Some(anchor_index) = self.anchor else {
            if qualifying {
                self.adopt_anchor(index);
                return CalibrationOutcome::Anchored { index };
            }
            return CalibrationOutcome::Idle;
        };

        if self.sample_count > self.max_steps {
            let overran = self.sample_count;
            if qualifying {
                self.adopt_anchor(index);
                return CalibrationOutcome::Reanchored { index };
            }
            self.clear_window();
            return CalibrationOutcome::Abandoned { sample_count: overran };
        }

        if self.sample_count < self.min_steps || !qualifying {
            return CalibrationOutcome::Waiting {
                sample_count: self.sample_count,
            };
        }

        let Some(anchor) = history.at(anchor_index) else {
            // anchor slot vanished; start over
            self.clear_window();
            return CalibrationOutcome::Abandoned {
                sample_count: self.sample_count,
            };
        };

        let distance_m = great_circle_distance(anchor.gps_fix.coordinate, record.gps_fix.coordinate);
        let step_length_m = distance_m / f64::from(self.sample_count);
        if !(step_length_m.is_finite() && step_length_m > 0.0) {
            // standing still between two good fixes says nothing about stride
            return CalibrationOutcome::Waiting {
                sample_count: self.sample_count,
            };
        }

        self.step_length_m = step_length_m;
        self.is_calibrated = true;
        CalibrationOutcome::Converged {
            step_length_m,
            distance_m,
            sample_count: self.sample_count,
        }
    }

    /// Drop the window and the calibrated flag. The step length is kept.
    pub fn restart(&mut self) {
        self.clear_window();
        self.is_calibrated = false;
    }

    pub fn set_step_length(&mut self, step_length_m: f64) {
        self.step_length_m = step_length_m;
    }

    pub fn step_length(&self) -> f64 {
        self.step_length_m
    }

    pub fn is_calibrated(&self) -> bool {
        self.is_calibrated
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn anchor(&self) -> Option<HistoryIndex> {
        self.anchor
    }

    pub fn phase(&self) -> CalibrationPhase {
        if self.is_calibrated {
            CalibrationPhase::Calibrated
        } else if self.anchor.is_some() {
            CalibrationPhase::Accumulating
        } else {
            CalibrationPhase::Unanchored
        }
    }

    fn adopt_anchor(&mut self, index: HistoryIndex) {
        self.anchor = Some(index);
        self.sample_count = 1;
    }

    fn clear_window(&mut self) {
        self.anchor = None;
        self.sample_count = 0;
    }
}
