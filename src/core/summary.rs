//! Run statistics for display after scoring.

use crate::core::classifier::{SleepLabel, SleepReport};
use crate::core::epochs::CountsSeries;
use crate::input::SensorId;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Vector-magnitude count statistics of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorActivity {
    pub sensor: SensorId,
    pub epochs: usize,
    pub mean_count: f64,
    pub std_dev_count: f64,
}

impl SensorActivity {
    pub fn from_series(series: &CountsSeries) -> Self {
        let counts = series.counts();
        let mean_count = if counts.is_empty() {
            0.0
        } else {
            counts.iter().mean()
        };
        // Sample standard deviation is undefined below two epochs.
        let std_dev_count = if counts.len() < 2 {
            0.0
        } else {
            counts.iter().std_dev()
        };

        Self {
            sensor: series.sensor,
            epochs: counts.len(),
            mean_count,
            std_dev_count,
        }
    }
}

/// Totals of a classified run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub algorithm: String,
    pub total_epochs: usize,
    pub sleep_epochs: usize,
    pub wake_epochs: usize,
    pub boundary_epochs: usize,
    /// Fraction of epochs scored as sleep
    pub sleep_efficiency: f64,
    pub sensors: Vec<SensorActivity>,
}

impl RunSummary {
    pub fn new(report: &SleepReport, counts: &[CountsSeries]) -> Self {
        let total_epochs = report.len();
        let sleep_epochs = report.count_label(SleepLabel::Sleep);
        let sleep_efficiency = if total_epochs == 0 {
            0.0
        } else {
            sleep_epochs as f64 / total_epochs as f64
        };

        Self {
            algorithm: report.algorithm.clone(),
            total_epochs,
            sleep_epochs,
            wake_epochs: report.count_label(SleepLabel::Wake),
            boundary_epochs: report
                .labels
                .iter()
                .filter(|c| c.boundary_approximate)
                .count(),
            sleep_efficiency,
            sensors: counts.iter().map(SensorActivity::from_series).collect(),
        }
    }

    /// Summary string for display.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Run Summary ({}):\n\
             - Epochs scored: {}\n\
             - Sleep epochs: {}\n\
             - Wake epochs: {}\n\
             - Boundary-approximate epochs: {}\n\
             - Sleep efficiency: {:.1}%",
            self.algorithm,
            self.total_epochs,
            self.sleep_epochs,
            self.wake_epochs,
            self.boundary_epochs,
            self.sleep_efficiency * 100.0
        );

        if !self.sensors.is_empty() {
            out.push_str("\n\nActivity counts (vector magnitude):");
            for s in &self.sensors {
                out.push_str(&format!(
                    "\n- {}: mean {:.1}, std dev {:.1} over {} epochs",
                    s.sensor, s.mean_count, s.std_dev_count, s.epochs
                ));
            }
        }
        out
    }
}
