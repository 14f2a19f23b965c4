// step_fusion.rs: pure computation layer for the stride tracker
//
// Nothing in this module touches threads, files or sensor hardware.
// Step and GPS notifications come in, fused positions and step counts go out
// to a display sink, and every call reports what it did as FusionEvents.
// Sensors are pulled through the LocationProvider / OrientationProvider traits
// so recorded sessions and live hosts drive the same code.

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationOutcome, CalibrationPhase, Calibrator};
use crate::config::FusionConfig;
use crate::error::{FusionError, FusionResult};
use crate::geodesy::project;
use crate::history::{HistoryIndex, PositionHistory};
use crate::sensors::SensorState;
use crate::types::{Coordinate, DeadReckonedPosition, FusedRecord, GpsFix, Position, SensorEvent};

// ─── Collaborators ───────────────────────────────────────────────────────────

pub trait LocationProvider {
    /// Latest fix, `None` until the provider has produced one.
    fn current_fix(&self) -> Option<GpsFix>;

    fn is_indoor_now(&self) -> bool {
        self.current_fix().map_or(false, |fix| fix.is_indoor)
    }
}

pub trait OrientationProvider {
    /// Compass bearing in radians, clockwise from north.
    fn current_azimuth(&self) -> f64;
}

/// Receives display updates. Calls are fire-and-forget.
pub trait DisplaySink {
    fn set_user_position(&mut self, position: Position);
    fn set_step_counter_label(&mut self, count: u64);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// No GPS fix obtained yet, nothing to anchor on.
    NoGpsFix,
    /// Indoor with an empty history, nothing to reckon from.
    IndoorWithoutAnchor,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FusionEvent {
    GpsReady { coordinate: Coordinate },
    StepIgnored { timestamp_ms: i64, reason: IgnoreReason },
    RecordCommitted { index: HistoryIndex, reset: bool, indoor: bool, displayed: Position },
    CalibrationAnchored { index: HistoryIndex },
    CalibrationReanchored { index: HistoryIndex },
    CalibrationConverged { step_length_m: f64, distance_m: f64, sample_count: u32 },
    CalibrationAbandoned { sample_count: u32 },
    CalibrationRestarted,
    ConfigUpdated { step_length_m: f64 },
}

// ─── Fusion output snapshot ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusionSnapshot {
    pub step_count: u64,
    pub history_len: usize,
    pub write_index: usize,
    pub calibration_phase: CalibrationPhase,
    pub calibration_samples: u32,
    pub step_length_m: f64,
    pub is_calibrated: bool,
    pub last_position: Option<Position>,
    pub last_known_gps: Option<GpsFix>,
}

// ─── The engine ──────────────────────────────────────────────────────────────

pub struct FusionEngine {
    config: FusionConfig,
    history: PositionHistory,
    calibrator: Calibrator,
    step_count: u64,
    last_known_gps: Option<GpsFix>,
    last_position: Option<Position>,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> FusionResult<Self> {
        config.validate()?;
        Ok(Self {
            history: PositionHistory::new(config.history_capacity),
            calibrator: Calibrator::new(&config),
            step_count: 0,
            last_known_gps: None,
            last_position: None,
            config,
        })
    }

    // ── Sensor feeds ─────────────────────────────────────────────────────

    /// First fix ever obtained: show it straight away, without touching history.
    pub fn on_gps_ready(&mut self, fix: GpsFix, sink: &mut impl DisplaySink) -> Vec<FusionEvent> {
        self.last_known_gps = Some(fix);
        self.display(Position::from(fix), sink);
        log::info!(
            "GPS ready at ({:.6}, {:.6}), accuracy {:.1} m",
            fix.coordinate.latitude,
            fix.coordinate.longitude,
            fix.accuracy_m
        );
        vec![FusionEvent::GpsReady {
            coordinate: fix.coordinate,
        }]
    }

    /// One detected step. Commits a record, updates the display and drives calibration.
    pub fn on_step_detected(
        &mut self,
        timestamp_ms: i64,
        location: &impl LocationProvider,
        orientation: &impl OrientationProvider,
        sink: &mut impl DisplaySink,
    ) -> Vec<FusionEvent> {
        let mut events = Vec::new();

        let Some(fix) = location.current_fix().or(self.last_known_gps) else {
            log::debug!("step at {timestamp_ms} ms ignored: no GPS fix yet");
            events.push(FusionEvent::StepIgnored {
                timestamp_ms,
                reason: IgnoreReason::NoGpsFix,
            });
            return events;
        };
        self.last_known_gps = Some(fix);
        let indoor = location.is_indoor_now();

        let write_index = self.history.current_index();
        let previous = self.history.latest().copied();

        let reset = match previous {
            None if indoor => {
                log::debug!("step at {timestamp_ms} ms ignored: indoor with empty history");
                events.push(FusionEvent::StepIgnored {
                    timestamp_ms,
                    reason: IgnoreReason::IndoorWithoutAnchor,
                });
                return events;
            }
            None => true,
            Some(prev) => {
                (prev.was_indoor && indoor)
                    || (!indoor && write_index.is_multiple_of(self.config.reset_interval))
            }
        };

        let reckoned = match previous {
            Some(prev) if indoor || !reset => project(
                prev.reckoned.coordinate,
                self.calibrator.step_length(),
                orientation.current_azimuth(),
                timestamp_ms,
            ),
            _ => DeadReckonedPosition {
                coordinate: fix.coordinate,
                timestamp_ms,
            },
        };
        if reset && !indoor {
            log::debug!("re-anchored on GPS at slot {}", write_index.get());
        }

        let index = self.history.append(FusedRecord {
            reckoned,
            gps_fix: fix,
            was_indoor: indoor,
        });

        // Outdoors the fix itself is shown; the reckoned track bridges indoor gaps.
        let displayed = if indoor {
            Position::from(reckoned)
        } else {
            Position::from(fix)
        };
        self.display(displayed, sink);
        events.push(FusionEvent::RecordCommitted {
            index,
            reset,
            indoor,
            displayed,
        });

        if !self.calibrator.is_calibrated() {
            let outcome = self.calibrator.observe(&self.history, index);
            events.extend(self.calibration_event(outcome));
        }

        self.step_count += 1;
        sink.set_step_counter_label(self.step_count);

        events
    }

    /// Route one recorded or live sensor event, keeping `sensors` current.
    pub fn dispatch(
        &mut self,
        event: &SensorEvent,
        sensors: &mut SensorState,
        sink: &mut impl DisplaySink,
    ) -> Vec<FusionEvent> {
        match *event {
            SensorEvent::GpsReady { fix } => {
                sensors.update_fix(fix);
                self.on_gps_ready(fix, sink)
            }
            SensorEvent::GpsFixReceived { fix } => {
                let first = !sensors.is_gps_ready();
                sensors.update_fix(fix);
                if first {
                    self.on_gps_ready(fix, sink)
                } else {
                    Vec::new()
                }
            }
            SensorEvent::OrientationUpdated { azimuth_rad } => {
                sensors.update_azimuth(azimuth_rad);
                Vec::new()
            }
            SensorEvent::StepDetected { timestamp_ms } => {
                self.on_step_detected(timestamp_ms, &*sensors, &*sensors, sink)
            }
        }
    }

    // ── Control ──────────────────────────────────────────────────────────

    /// Replace the configuration. History capacity is fixed at construction;
    /// a changed step length is applied as a manual override.
    pub fn update_config(&mut self, config: FusionConfig) -> FusionResult<Vec<FusionEvent>> {
        config.validate()?;
        if config.history_capacity != self.config.history_capacity {
            return Err(FusionError::ImmutableConfig("history_capacity"));
        }
        if config.step_length_m != self.config.step_length_m {
            self.calibrator.set_step_length(config.step_length_m);
            log::info!("step length overridden to {:.3} m", config.step_length_m);
        }
        self.calibrator.apply_thresholds(&config);
        self.config = config;
        Ok(vec![FusionEvent::ConfigUpdated {
            step_length_m: self.calibrator.step_length(),
        }])
    }

    /// Reopen calibration. The current step length stays in use until a new estimate converges.
    pub fn recalibrate(&mut self) -> Vec<FusionEvent> {
        self.calibrator.restart();
        log::info!("calibration restarted");
        vec![FusionEvent::CalibrationRestarted]
    }

    pub fn set_step_count(&mut self, value: u64) {
        self.step_count = value;
    }

    pub fn reset_step_count(&mut self) {
        self.step_count = 0;
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn step_length(&self) -> f64 {
        self.calibrator.step_length()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_calibrated()
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn snapshot(&self) -> FusionSnapshot {
        FusionSnapshot {
            step_count: self.step_count,
            history_len: self.history.len(),
            write_index: self.history.current_index().get(),
            calibration_phase: self.calibrator.phase(),
            calibration_samples: self.calibrator.sample_count(),
            step_length_m: self.calibrator.step_length(),
            is_calibrated: self.calibrator.is_calibrated(),
            last_position: self.last_position,
            last_known_gps: self.last_known_gps,
        }
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn display(&mut self, position: Position, sink: &mut impl DisplaySink) {
        self.last_position = Some(position);
        sink.set_user_position(position);
    }

    fn calibration_event(&self, outcome: CalibrationOutcome) -> Option<FusionEvent> {
        match outcome {
            CalibrationOutcome::Idle => None,
            CalibrationOutcome::Waiting { sample_count } => {
                log::debug!("calibration window at {sample_count} samples");
                None
            }
            CalibrationOutcome::Anchored { index } => {
                log::info!("calibration anchored at slot {}", index.get());
                Some(FusionEvent::CalibrationAnchored { index })
            }
            CalibrationOutcome::Reanchored { index } => {
                log::info!("calibration window overran, re-anchored at slot {}", index.get());
                Some(FusionEvent::CalibrationReanchored { index })
            }
            CalibrationOutcome::Abandoned { sample_count } => {
                log::info!("calibration abandoned after {sample_count} samples");
                Some(FusionEvent::CalibrationAbandoned { sample_count })
            }
            CalibrationOutcome::Converged {
                step_length_m,
                distance_m,
                sample_count,
            } => {
                log::info!(
                    "step length calibrated: {step_length_m:.3} m ({distance_m:.1} m over {sample_count} steps)"
                );
                Some(FusionEvent::CalibrationConverged {
                    step_length_m,
                    distance_m,
                    sample_count,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::great_circle_distance;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    const ORIGIN: Coordinate = Coordinate {
        latitude: 49.4,
        longitude: 2.8,
    };

    #[derive(Default)]
    struct RecordingSink {
        positions: Vec<Position>,
        labels: Vec<u64>,
    }

    impl DisplaySink for RecordingSink {
        fn set_user_position(&mut self, position: Position) {
            self.positions.push(position);
        }
        fn set_step_counter_label(&mut self, count: u64) {
            self.labels.push(count);
        }
    }

    fn outdoor_fix(coordinate: Coordinate, timestamp_ms: i64) -> GpsFix {
        GpsFix::new(coordinate, 4.0, timestamp_ms, false)
    }

    fn engine() -> FusionEngine {
        FusionEngine::new(FusionConfig::default()).unwrap()
    }

    fn step(engine: &mut FusionEngine, sensors: &mut SensorState, sink: &mut RecordingSink, ts: i64) -> Vec<FusionEvent> {
        engine.dispatch(&SensorEvent::StepDetected { timestamp_ms: ts }, sensors, sink)
    }

    fn committed(events: &[FusionEvent]) -> Option<(HistoryIndex, bool)> {
        events.iter().find_map(|e| match e {
            FusionEvent::RecordCommitted { index, reset, .. } => Some((*index, *reset)),
            _ => None,
        })
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = FusionConfig {
            reset_interval: 0,
            ..FusionConfig::default()
        };
        assert!(FusionEngine::new(config).is_err());
    }

    #[test]
    fn test_step_before_gps_is_ignored() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();

        let events = step(&mut engine, &mut sensors, &mut sink, 100);
        assert_eq!(
            events,
            vec![FusionEvent::StepIgnored {
                timestamp_ms: 100,
                reason: IgnoreReason::NoGpsFix
            }]
        );
        assert_eq!(engine.step_count(), 0);
        assert!(engine.history().is_empty());
        assert!(sink.positions.is_empty());
        assert!(sink.labels.is_empty());
    }

    #[test]
    fn test_gps_ready_displays_fix_without_history() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        let fix = outdoor_fix(ORIGIN, 0);

        let events = engine.dispatch(&SensorEvent::GpsReady { fix }, &mut sensors, &mut sink);
        assert_eq!(events, vec![FusionEvent::GpsReady { coordinate: ORIGIN }]);
        assert_eq!(sink.positions, vec![Position::from(fix)]);
        assert!(engine.history().is_empty());
        assert_eq!(engine.snapshot().last_known_gps, Some(fix));
    }

    #[test]
    fn test_first_fix_received_acts_as_gps_ready() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();

        let first = engine.dispatch(&SensorEvent::GpsFixReceived { fix: outdoor_fix(ORIGIN, 0) }, &mut sensors, &mut sink);
        assert!(matches!(first.as_slice(), [FusionEvent::GpsReady { .. }]));
        let second = engine.dispatch(&SensorEvent::GpsFixReceived { fix: outdoor_fix(ORIGIN, 1_000) }, &mut sensors, &mut sink);
        assert!(second.is_empty());
        assert_eq!(sink.positions.len(), 1);
    }

    #[test]
    fn test_first_outdoor_step_anchors_on_gps() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        let fix = outdoor_fix(ORIGIN, 0);
        engine.dispatch(&SensorEvent::GpsReady { fix }, &mut sensors, &mut sink);
        sensors.update_azimuth(1.0);

        let events = step(&mut engine, &mut sensors, &mut sink, 500);
        let (index, reset) = committed(&events).unwrap();
        assert!(reset);
        let record = engine.history().at(index).unwrap();
        assert_eq!(record.reckoned.coordinate, ORIGIN);
        assert_eq!(record.reckoned.timestamp_ms, 500);
        assert_eq!(record.gps_fix, fix);
        assert!(!record.was_indoor);
        assert_eq!(engine.step_count(), 1);
        assert_eq!(sink.labels, vec![1]);
    }

    #[test]
    fn test_first_indoor_step_is_dropped() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        let fix = GpsFix::new(ORIGIN, 30.0, 0, true);
        engine.dispatch(&SensorEvent::GpsReady { fix }, &mut sensors, &mut sink);

        let events = step(&mut engine, &mut sensors, &mut sink, 500);
        assert_eq!(
            events,
            vec![FusionEvent::StepIgnored {
                timestamp_ms: 500,
                reason: IgnoreReason::IndoorWithoutAnchor
            }]
        );
        assert_eq!(engine.step_count(), 0);
        assert!(engine.history().is_empty());
        assert!(sink.labels.is_empty());
    }

    #[test]
    fn test_outdoor_steps_reckon_but_display_gps() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        let fix = outdoor_fix(ORIGIN, 0);
        engine.dispatch(&SensorEvent::GpsReady { fix }, &mut sensors, &mut sink);
        sensors.update_azimuth(FRAC_PI_2);

        step(&mut engine, &mut sensors, &mut sink, 500);
        let events = step(&mut engine, &mut sensors, &mut sink, 1_000);

        let (index, reset) = committed(&events).unwrap();
        assert!(!reset);
        let record = engine.history().at(index).unwrap();
        assert_relative_eq!(
            great_circle_distance(ORIGIN, record.reckoned.coordinate),
            0.75,
            max_relative = 1e-6
        );
        assert!(record.reckoned.coordinate.longitude > ORIGIN.longitude);
        // outdoors the raw fix is what gets shown
        assert_eq!(sink.positions.last(), Some(&Position::from(fix)));
    }

    #[test]
    fn test_periodic_reanchoring_every_reset_interval() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        engine.dispatch(&SensorEvent::GpsReady { fix: outdoor_fix(ORIGIN, 0) }, &mut sensors, &mut sink);
        sensors.update_azimuth(0.3);

        for n in 0..35i64 {
            let live = project(ORIGIN, n as f64 * 2.0, 2.0, n * 600).coordinate;
            sensors.update_fix(GpsFix::new(live, 15.0, n * 600 - 400, false));
            let events = step(&mut engine, &mut sensors, &mut sink, n * 600);
            let (index, reset) = committed(&events).unwrap();
            let record = engine.history().at(index).unwrap();

            assert_eq!(reset, index.get() % 10 == 0, "slot {}", index.get());
            if reset {
                assert_eq!(record.reckoned.coordinate, live);
            } else {
                assert_ne!(record.reckoned.coordinate, live);
            }
        }
        assert_eq!(engine.step_count(), 35);
    }

    #[test]
    fn test_indoor_steps_reckon_from_last_position() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        engine.dispatch(&SensorEvent::GpsReady { fix: outdoor_fix(ORIGIN, 0) }, &mut sensors, &mut sink);
        sensors.update_azimuth(0.0);
        step(&mut engine, &mut sensors, &mut sink, 500);

        // signal degrades, provider flips to indoor with a stale fix
        sensors.update_fix(GpsFix::new(ORIGIN, 40.0, 0, true));
        let first_indoor = step(&mut engine, &mut sensors, &mut sink, 1_000);
        let second_indoor = step(&mut engine, &mut sensors, &mut sink, 1_500);

        let (_, reset_first) = committed(&first_indoor).unwrap();
        let (index, reset_second) = committed(&second_indoor).unwrap();
        assert!(!reset_first);
        assert!(reset_second);

        let shown = sink.positions.last().unwrap();
        assert!(shown.is_reckoned());
        assert_abs_diff_eq!(great_circle_distance(ORIGIN, shown.coordinate), 1.5, epsilon = 1e-6);
        assert!(engine.history().at(index).unwrap().was_indoor);
    }

    #[test]
    fn test_step_count_matches_committed_records() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();

        step(&mut engine, &mut sensors, &mut sink, 0);
        engine.dispatch(&SensorEvent::GpsReady { fix: GpsFix::new(ORIGIN, 30.0, 0, true) }, &mut sensors, &mut sink);
        step(&mut engine, &mut sensors, &mut sink, 100);
        assert_eq!(engine.step_count(), 0);

        sensors.update_fix(outdoor_fix(ORIGIN, 200));
        for k in 0..120 {
            step(&mut engine, &mut sensors, &mut sink, 300 + k * 500);
        }
        assert_eq!(engine.step_count(), 120);
        assert_eq!(sink.labels.len(), 120);
        assert_eq!(sink.labels.last(), Some(&120));
        assert_eq!(engine.history().len(), engine.history().capacity());
    }

    #[test]
    fn test_calibration_through_engine() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        engine.dispatch(&SensorEvent::GpsReady { fix: outdoor_fix(ORIGIN, 0) }, &mut sensors, &mut sink);

        // anchor: fix paired with the step within 10 ms
        sensors.update_fix(outdoor_fix(ORIGIN, 1_000));
        let events = step(&mut engine, &mut sensors, &mut sink, 1_005);
        assert!(events.iter().any(|e| matches!(e, FusionEvent::CalibrationAnchored { .. })));

        // 28 steps while the signal is too coarse to measure with
        sensors.update_fix(GpsFix::new(ORIGIN, 25.0, 1_300, false));
        for k in 1..29 {
            step(&mut engine, &mut sensors, &mut sink, 1_005 + k * 600);
        }
        assert_eq!(engine.calibrator().sample_count(), 29);

        let end = project(ORIGIN, 24.0, 0.8, 0).coordinate;
        let d = great_circle_distance(ORIGIN, end);
        sensors.update_fix(outdoor_fix(end, 1_005 + 29 * 600));
        let events = step(&mut engine, &mut sensors, &mut sink, 1_005 + 29 * 600);

        assert!(events
            .iter()
            .any(|e| matches!(e, FusionEvent::CalibrationConverged { sample_count: 30, .. })));
        assert!(engine.is_calibrated());
        assert_relative_eq!(engine.step_length(), d / 30.0, max_relative = 1e-12);

        // calibrated engines stop feeding the calibrator
        let samples = engine.calibrator().sample_count();
        step(&mut engine, &mut sensors, &mut sink, 1_005 + 30 * 600);
        assert_eq!(engine.calibrator().sample_count(), samples);

        let events = engine.recalibrate();
        assert_eq!(events, vec![FusionEvent::CalibrationRestarted]);
        assert_eq!(engine.snapshot().calibration_phase, CalibrationPhase::Unanchored);
        assert_relative_eq!(engine.step_length(), d / 30.0, max_relative = 1e-12);
    }

    #[test]
    fn test_calibration_with_fixes_older_than_steps() {
        let mut engine = engine();
        let mut sensors = SensorState::new();
        let mut sink = RecordingSink::default();
        engine.dispatch(&SensorEvent::GpsReady { fix: outdoor_fix(ORIGIN, 1_000) }, &mut sensors, &mut sink);

        // each step sees the fix delivered 300 ms before it
        let events = step(&mut engine, &mut sensors, &mut sink, 1_300);
        assert!(events.iter().any(|e| matches!(e, FusionEvent::CalibrationAnchored { .. })));

        let mut converged = None;
        for k in 1..20i64 {
            let walked = project(ORIGIN, k as f64 * 0.7, 0.0, 0).coordinate;
            sensors.update_fix(outdoor_fix(walked, 1_000 + k * 600));
            let events = step(&mut engine, &mut sensors, &mut sink, 1_300 + k * 600);
            converged = converged.or_else(|| {
                events.iter().find_map(|e| match e {
                    FusionEvent::CalibrationConverged { sample_count, .. } => Some(*sample_count),
                    _ => None,
                })
            });
        }

        assert_eq!(converged, Some(20));
        assert!(engine.is_calibrated());
        assert_relative_eq!(engine.step_length(), 19.0 * 0.7 / 20.0, max_relative = 1e-6);
    }

    #[test]
    fn test_update_config_overrides_step_length() {
        let mut engine = engine();
        let config = FusionConfig {
            step_length_m: 0.62,
            ..FusionConfig::default()
        };
        let events = engine.update_config(config).unwrap();
        assert_eq!(events, vec![FusionEvent::ConfigUpdated { step_length_m: 0.62 }]);
        assert_eq!(engine.step_length(), 0.62);
        assert!(!engine.is_calibrated());
    }

    #[test]
    fn test_update_config_rejects_capacity_change() {
        let mut engine = engine();
        let config = FusionConfig {
            history_capacity: 200,
            ..FusionConfig::default()
        };
        assert_eq!(
            engine.update_config(config),
            Err(FusionError::ImmutableConfig("history_capacity"))
        );
        let bad = FusionConfig {
            step_length_m: -1.0,
            ..FusionConfig::default()
        };
        assert!(matches!(engine.update_config(bad), Err(FusionError::InvalidConfig(_))));
        assert_eq!(engine.step_length(), 0.75);
    }

    #[test]
    fn test_step_counter_control() {
        let mut engine = engine();
        engine.set_step_count(41);
        assert_eq!(engine.step_count(), 41);
        engine.reset_step_count();
        assert_eq!(engine.snapshot().step_count, 0);
    }
}
