//! Sleep/wake labels and the classifier contract shared by all algorithms.

use crate::core::epochs::CountsSeries;
use crate::error::ActigraphyError;
use crate::input::SensorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-epoch sleep state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepLabel {
    #[serde(rename = "S")]
    Sleep,
    #[serde(rename = "W")]
    Wake,
}

impl std::fmt::Display for SleepLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SleepLabel::Sleep => write!(f, "S"),
            SleepLabel::Wake => write!(f, "W"),
        }
    }
}

/// Which stream a classification was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    Sensor(SensorId),
    Combined,
}

impl std::fmt::Display for LabelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelSource::Sensor(id) => write!(f, "{id}"),
            LabelSource::Combined => write!(f, "combined"),
        }
    }
}

/// Weighted-sum statistic of one epoch before thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepIndex {
    pub epoch_index: usize,
    pub sensor: SensorId,
    pub value: f64,
}

/// Final per-epoch label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub epoch_start: DateTime<Utc>,
    pub source: LabelSource,
    pub label: SleepLabel,
    /// The scoring window ran past either end of the series and missing
    /// neighbours were counted as zero.
    pub boundary_approximate: bool,
}

/// Scores of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorScores {
    pub sensor: SensorId,
    pub sleep_indices: Vec<SleepIndex>,
    pub classifications: Vec<Classification>,
}

/// Output of a classifier run: per-sensor scores and the final labels.
///
/// With a single sensor `labels` are that sensor's classifications; with
/// several they are the fused, [`LabelSource::Combined`] labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepReport {
    pub algorithm: String,
    pub sensors: Vec<SensorScores>,
    pub labels: Vec<Classification>,
}

impl SleepReport {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of final labels equal to `label`.
    pub fn count_label(&self, label: SleepLabel) -> usize {
        self.labels.iter().filter(|c| c.label == label).count()
    }
}

/// A sleep/wake scoring algorithm over epoch counts.
///
/// Implementations validate the number of series they accept and fail with
/// [`ActigraphyError::SensorCountMismatch`] otherwise.
pub trait SleepClassifier {
    /// Short algorithm name used in reports.
    fn name(&self) -> &'static str;

    /// Score the given series.
    fn classify(&self, series: &[CountsSeries]) -> Result<SleepReport, ActigraphyError>;
}
