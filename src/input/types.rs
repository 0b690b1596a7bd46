//! Raw accelerometer record types.
//!
//! These types carry exactly what a body-worn sensor export provides: a
//! timestamp and three acceleration components in units of g.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-based identifier of a body-worn sensor (one input file per sensor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SensorId(pub u8);

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sensor_{}", self.0)
    }
}

/// A single tri-axial accelerometer reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Acceleration along the x axis (g)
    pub x: f64,
    /// Acceleration along the y axis (g)
    pub y: f64,
    /// Acceleration along the z axis (g)
    pub z: f64,
}

impl RawSample {
    pub fn new(timestamp: DateTime<Utc>, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }
}

/// The complete raw recording of one sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorInput {
    pub sensor: SensorId,
    pub samples: Vec<RawSample>,
}

impl SensorInput {
    pub fn new(sensor: SensorId, samples: Vec<RawSample>) -> Self {
        Self { sensor, samples }
    }

    /// Whether the recording holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Seconds elapsed from `from` to `to`, with nanosecond resolution.
pub(crate) fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
