//! Aggregation of filtered samples into fixed-length activity-count epochs.
//!
//! Each sample is rectified and quantized the way an ActiGraph device counts
//! movement: amplitudes below a dead-band are dropped, amplitudes above the
//! saturation level are capped, and the rest is scaled to 8-bit resolution.
//! Epochs are wall-clock windows aligned to the first sample; a trailing
//! window shorter than the epoch length is discarded.

use crate::core::signal::FilteredSignal;
use crate::error::ActigraphyError;
use crate::input::SensorId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default epoch length in seconds.
pub const DEFAULT_EPOCH_SECS: i64 = 60;

/// Per-sample count quantization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountConfig {
    /// Rectified amplitudes below this are treated as no movement (g)
    pub dead_band_g: f64,
    /// Amplitudes above this are capped (g)
    pub saturation_g: f64,
    /// Quantization steps between zero and saturation
    pub resolution: f64,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            dead_band_g: 0.068,
            saturation_g: 2.13,
            resolution: 128.0,
        }
    }
}

impl CountConfig {
    /// Count contribution of one rectified amplitude.
    pub fn quantize(&self, amplitude: f64) -> u64 {
        let amplitude = amplitude.abs();
        if amplitude < self.dead_band_g {
            return 0;
        }
        let capped = amplitude.min(self.saturation_g);
        (capped / self.saturation_g * self.resolution).round() as u64
    }
}

/// Activity counts of one sensor over one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochCount {
    /// Start of the epoch window
    pub epoch_start: DateTime<Utc>,
    /// Sensor the counts belong to
    pub sensor: SensorId,
    /// Per-axis counts in x, y, z order
    pub axis_counts: [u64; 3],
    /// Vector-magnitude count; the value classifiers consume
    pub count: u64,
}

/// Contiguous epoch counts of one sensor, indexed by epoch number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsSeries {
    pub sensor: SensorId,
    /// Epoch length in seconds
    pub epoch_secs: i64,
    pub epochs: Vec<EpochCount>,
}

impl CountsSeries {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Start of the first epoch, if any.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.epochs.first().map(|e| e.epoch_start)
    }

    /// Vector-magnitude counts in epoch order.
    pub fn counts(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.count as f64).collect()
    }
}

/// Sums quantized samples into epochs.
#[derive(Debug, Clone)]
pub struct EpochAggregator {
    epoch_secs: i64,
    config: CountConfig,
}

impl Default for EpochAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_EPOCH_SECS, CountConfig::default())
    }
}

impl EpochAggregator {
    pub fn new(epoch_secs: i64, config: CountConfig) -> Self {
        Self { epoch_secs, config }
    }

    pub fn epoch_secs(&self) -> i64 {
        self.epoch_secs
    }

    /// Aggregate a filtered signal into a counts series.
    ///
    /// Window membership is decided by each sample's time offset, not its
    /// index, so the sampling rate never shifts epoch boundaries.
    pub fn aggregate(&self, filtered: &FilteredSignal) -> Result<CountsSeries, ActigraphyError> {
        if self.epoch_secs <= 0 {
            return Err(ActigraphyError::InvalidEpochLength(self.epoch_secs));
        }
        if filtered.is_empty() {
            return Err(ActigraphyError::EmptySignal {
                stage: "epoch aggregator",
            });
        }

        let signal = filtered.signal();
        let epoch_nanos = self
            .epoch_secs
            .checked_mul(1_000_000_000)
            .ok_or(ActigraphyError::InvalidEpochLength(self.epoch_secs))?;
        let full_epochs = (signal.offset_nanos(signal.len()) / epoch_nanos) as usize;

        let mut epochs: Vec<EpochCount> = (0..full_epochs)
            .map(|i| EpochCount {
                epoch_start: signal.start + Duration::seconds(self.epoch_secs * i as i64),
                sensor: signal.sensor,
                axis_counts: [0; 3],
                count: 0,
            })
            .collect();

        for k in 0..signal.len() {
            let index = (signal.offset_nanos(k) / epoch_nanos) as usize;
            let Some(epoch) = epochs.get_mut(index) else {
                break;
            };

            let (x, y, z) = (signal.x[k], signal.y[k], signal.z[k]);
            epoch.axis_counts[0] += self.config.quantize(x);
            epoch.axis_counts[1] += self.config.quantize(y);
            epoch.axis_counts[2] += self.config.quantize(z);
            epoch.count += self.config.quantize((x * x + y * y + z * z).sqrt());
        }

        Ok(CountsSeries {
            sensor: signal.sensor,
            epoch_secs: self.epoch_secs,
            epochs,
        })
    }
}
