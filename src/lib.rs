// Stride tracker core
// Fuses intermittent GPS fixes with pedometer steps and a compass bearing,
// and learns the walker's step length from GPS ground truth.

pub mod calibration;
pub mod config;
pub mod error;
pub mod executor;
pub mod export;
pub mod geodesy;
pub mod history;
pub mod sensors;
pub mod step_fusion;
pub mod types;

pub use calibration::{CalibrationOutcome, CalibrationPhase, Calibrator};
pub use config::{FusionConfig, SensorThresholds};
pub use error::{FusionError, FusionResult};
pub use executor::{FusionHandle, FusionWorker, SharedEngine, WorkerReport};
pub use history::{HistoryIndex, PositionHistory};
pub use sensors::SensorState;
pub use step_fusion::{
    DisplaySink, FusionEngine, FusionEvent, FusionSnapshot, IgnoreReason, LocationProvider,
    OrientationProvider,
};
pub use types::{Coordinate, DeadReckonedPosition, FusedRecord, GpsFix, Position, PositionSource, SensorEvent};
