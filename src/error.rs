//! Typed failures raised by the counting and classification stages.

use crate::input::SensorId;

/// Why a set of counts series was rejected by a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The number of sensors differs from the required count.
    Count { expected: usize, found: usize },
    /// The same sensor id appears more than once.
    DuplicateSensor(SensorId),
    /// A sensor's series has a different number of epochs than the first sensor.
    EpochCount {
        sensor: SensorId,
        expected: usize,
        found: usize,
    },
    /// A sensor's series starts at a different instant than the first sensor.
    StartTime { sensor: SensorId },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::Count { expected, found } => {
                write!(f, "expected {expected} sensor(s), got {found}")
            }
            Mismatch::DuplicateSensor(id) => write!(f, "{id} supplied more than once"),
            Mismatch::EpochCount {
                sensor,
                expected,
                found,
            } => write!(f, "{sensor} has {found} epochs, expected {expected}"),
            Mismatch::StartTime { sensor } => {
                write!(f, "{sensor} epochs do not start at the same instant")
            }
        }
    }
}

/// Errors produced by the core pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ActigraphyError {
    /// Sampling rate is missing, non-positive or not finite.
    InvalidRate(f64),
    /// A timestamp is earlier than the one before it.
    NonMonotonicTimestamp { index: usize },
    /// A sample holds a NaN or infinite acceleration.
    NonFiniteSample { index: usize },
    /// A stage received zero-length input.
    EmptySignal { stage: &'static str },
    /// Multi-sensor input has the wrong shape.
    SensorCountMismatch(Mismatch),
    /// Filter cutoffs are outside `(0, rate / 2)` or not ordered.
    InvalidCutoff { low_hz: f64, high_hz: f64, rate_hz: f64 },
    /// Epoch length is zero or negative.
    InvalidEpochLength(i64),
}

impl std::fmt::Display for ActigraphyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActigraphyError::InvalidRate(rate) => write!(f, "Invalid sampling rate: {rate} Hz"),
            ActigraphyError::NonMonotonicTimestamp { index } => {
                write!(f, "Timestamp at sample {index} is earlier than the previous one")
            }
            ActigraphyError::NonFiniteSample { index } => {
                write!(f, "Sample {index} has a non-finite acceleration")
            }
            ActigraphyError::EmptySignal { stage } => write!(f, "Empty input to {stage}"),
            ActigraphyError::SensorCountMismatch(reason) => {
                write!(f, "Sensor count mismatch: {reason}")
            }
            ActigraphyError::InvalidCutoff {
                low_hz,
                high_hz,
                rate_hz,
            } => write!(
                f,
                "Invalid filter band {low_hz}-{high_hz} Hz for a {rate_hz} Hz signal"
            ),
            ActigraphyError::InvalidEpochLength(secs) => {
                write!(f, "Invalid epoch length: {secs}s")
            }
        }
    }
}

impl std::error::Error for ActigraphyError {}

impl From<Mismatch> for ActigraphyError {
    fn from(reason: Mismatch) -> Self {
        ActigraphyError::SensorCountMismatch(reason)
    }
}
