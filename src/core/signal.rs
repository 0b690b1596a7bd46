//! Uniformly sampled tri-axial signals.

use crate::input::SensorId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tri-axial samples on a constant time grid `start + k / rate_hz`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformSignal {
    /// Sensor that produced the samples
    pub sensor: SensorId,
    /// Timestamp of sample 0
    pub start: DateTime<Utc>,
    /// Samples per second
    pub rate_hz: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl UniformSignal {
    /// Build a signal from axis columns of equal length.
    pub fn new(
        sensor: SensorId,
        start: DateTime<Utc>,
        rate_hz: f64,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    ) -> Self {
        debug_assert!(x.len() == y.len() && y.len() == z.len());
        Self {
            sensor,
            start,
            rate_hz,
            x,
            y,
            z,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Time covered by the samples, counting one sample period per sample.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.rate_hz
    }

    /// Offset of sample `k` from `start`, in whole nanoseconds.
    pub fn offset_nanos(&self, k: usize) -> i64 {
        (k as f64 * 1e9 / self.rate_hz).round() as i64
    }

    /// Timestamp of sample `k`.
    pub fn timestamp_at(&self, k: usize) -> DateTime<Utc> {
        self.start + Duration::nanoseconds(self.offset_nanos(k))
    }

    /// The three axis columns in x, y, z order.
    pub fn axes(&self) -> [&[f64]; 3] {
        [&self.x, &self.y, &self.z]
    }
}

/// A [`UniformSignal`] whose values have been band-limited.
///
/// Kept as a distinct type so counts can only be computed from filtered data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredSignal(UniformSignal);

impl FilteredSignal {
    pub(crate) fn from_filtered(signal: UniformSignal) -> Self {
        Self(signal)
    }

    /// The underlying samples.
    pub fn signal(&self) -> &UniformSignal {
        &self.0
    }

    pub fn into_inner(self) -> UniformSignal {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
