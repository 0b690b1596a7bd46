//! Cole-Kripke sleep/wake scoring for one sensor.
//!
//! For epoch `i` the sleep index is
//!
//! ```text
//! SI(i) = P * (w[-4]·a[i-4] + … + w[0]·a[i] + … + w[2]·a[i+2])
//! ```
//!
//! where `a` are the adjusted activity counts. An epoch is sleep when
//! `SI(i) < T`. Neighbours outside the series count as zero and the affected
//! epochs (first four, last two) are flagged as boundary-approximate.

use crate::core::classifier::{
    Classification, LabelSource, SensorScores, SleepClassifier, SleepIndex, SleepLabel,
    SleepReport,
};
use crate::core::epochs::CountsSeries;
use crate::error::{ActigraphyError, Mismatch};
use serde::{Deserialize, Serialize};

/// Epochs before the scored one that enter the window.
pub const LOOKBACK: usize = 4;
/// Epochs after the scored one that enter the window.
pub const LOOKAHEAD: usize = 2;
/// Window length.
pub const WINDOW: usize = LOOKBACK + 1 + LOOKAHEAD;

/// Constants of the 1-minute Cole-Kripke formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColeKripkeParams {
    /// Weights from `a[i-4]` through `a[i+2]`
    pub weights: [f64; WINDOW],
    /// Scale factor `P`
    pub scale: f64,
    /// Sleep when the index is strictly below this
    pub threshold: f64,
    /// Raw counts are divided by this before weighting
    pub count_divisor: f64,
    /// Adjusted counts are capped at this
    pub count_cap: f64,
}

impl Default for ColeKripkeParams {
    fn default() -> Self {
        Self {
            weights: [106.0, 54.0, 58.0, 76.0, 230.0, 74.0, 67.0],
            scale: 0.001,
            threshold: 1.0,
            count_divisor: 100.0,
            count_cap: 300.0,
        }
    }
}

impl ColeKripkeParams {
    /// Scale and cap a raw activity count.
    pub fn adjust(&self, count: f64) -> f64 {
        (count / self.count_divisor).min(self.count_cap)
    }
}

/// Single-sensor Cole-Kripke classifier.
#[derive(Debug, Clone, Default)]
pub struct ColeKripke {
    params: ColeKripkeParams,
}

impl ColeKripke {
    pub fn new(params: ColeKripkeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ColeKripkeParams {
        &self.params
    }

    /// Sleep index of every epoch in `series`.
    pub fn sleep_indices(&self, series: &CountsSeries) -> Result<Vec<SleepIndex>, ActigraphyError> {
        if series.is_empty() {
            return Err(ActigraphyError::EmptySignal {
                stage: "Cole-Kripke classifier",
            });
        }

        let adjusted: Vec<f64> = series
            .counts()
            .into_iter()
            .map(|c| self.params.adjust(c))
            .collect();
        let n = adjusted.len();

        Ok((0..n)
            .map(|i| {
                let weighted: f64 = self
                    .params
                    .weights
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, w)| {
                        // slot 0 is a[i-4], slot 4 is a[i], slot 6 is a[i+2]
                        let j = (i + slot).checked_sub(LOOKBACK)?;
                        adjusted.get(j).map(|a| w * a)
                    })
                    .sum();
                SleepIndex {
                    epoch_index: i,
                    sensor: series.sensor,
                    value: self.params.scale * weighted,
                }
            })
            .collect())
    }

    /// Sleep indices and labels for one sensor.
    pub fn score(&self, series: &CountsSeries) -> Result<SensorScores, ActigraphyError> {
        let sleep_indices = self.sleep_indices(series)?;
        let n = sleep_indices.len();

        let classifications = sleep_indices
            .iter()
            .zip(&series.epochs)
            .map(|(index, epoch)| Classification {
                epoch_start: epoch.epoch_start,
                source: LabelSource::Sensor(series.sensor),
                label: self.label_for(index.value),
                boundary_approximate: is_boundary(index.epoch_index, n),
            })
            .collect();

        Ok(SensorScores {
            sensor: series.sensor,
            sleep_indices,
            classifications,
        })
    }

    fn label_for(&self, sleep_index: f64) -> SleepLabel {
        if sleep_index < self.params.threshold {
            SleepLabel::Sleep
        } else {
            SleepLabel::Wake
        }
    }
}

/// Whether epoch `i` of `n` lacks a full scoring window.
pub fn is_boundary(i: usize, n: usize) -> bool {
    i < LOOKBACK || i + LOOKAHEAD >= n
}

impl SleepClassifier for ColeKripke {
    fn name(&self) -> &'static str {
        "cole-kripke"
    }

    fn classify(&self, series: &[CountsSeries]) -> Result<SleepReport, ActigraphyError> {
        let [only] = series else {
            return Err(Mismatch::Count {
                expected: 1,
                found: series.len(),
            }
            .into());
        };

        let scores = self.score(only)?;
        Ok(SleepReport {
            algorithm: self.name().to_string(),
            labels: scores.classifications.clone(),
            sensors: vec![scores],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::epochs::EpochCount;
    use crate::input::SensorId;
    use chrono::{DateTime, Duration};

    fn series(counts: &[u64]) -> CountsSeries {
        CountsSeries {
            sensor: SensorId(1),
            epoch_secs: 60,
            epochs: counts
                .iter()
                .enumerate()
                .map(|(i, &count)| EpochCount {
                    epoch_start: DateTime::UNIX_EPOCH + Duration::minutes(i as i64),
                    sensor: SensorId(1),
                    axis_counts: [count, 0, 0],
                    count,
                })
                .collect(),
        }
    }

    #[test]
    fn test_zero_activity_is_sleep() {
        let scores = ColeKripke::default().score(&series(&[0; 12])).unwrap();

        assert!(scores.sleep_indices.iter().all(|si| si.value == 0.0));
        assert!(scores
            .classifications
            .iter()
            .all(|c| c.label == SleepLabel::Sleep));
    }

    #[test]
    fn test_weighted_sum() {
        // A single burst of 1000 counts (adjusted 10) at epoch 5.
        let mut counts = [0u64; 10];
        counts[5] = 1000;
        let indices = ColeKripke::default()
            .sleep_indices(&series(&counts))
            .unwrap();

        let expected = [0.0, 0.0, 0.0, 0.67, 0.74, 2.30, 0.76, 0.58, 0.54, 1.06];
        for (si, want) in indices.iter().zip(expected) {
            assert!(
                (si.value - want).abs() < 1e-9,
                "epoch {}: {} != {}",
                si.epoch_index,
                si.value,
                want
            );
        }
    }

    #[test]
    fn test_threshold_and_cap() {
        let classifier = ColeKripke::default();

        // Adjusted count 4.3 alone at the centre weight gives 0.989: sleep.
        let mut counts = [0u64; 9];
        counts[4] = 430;
        let scores = classifier.score(&series(&counts)).unwrap();
        assert_eq!(scores.classifications[4].label, SleepLabel::Sleep);

        // 4.35 gives 1.0005: wake.
        counts[4] = 435;
        let scores = classifier.score(&series(&counts)).unwrap();
        assert_eq!(scores.classifications[4].label, SleepLabel::Wake);

        assert_eq!(classifier.params().adjust(1_000_000.0), 300.0);
    }

    #[test]
    fn test_boundary_flags() {
        let scores = ColeKripke::default().score(&series(&[0; 10])).unwrap();
        let flags: Vec<bool> = scores
            .classifications
            .iter()
            .map(|c| c.boundary_approximate)
            .collect();
        assert_eq!(
            flags,
            vec![true, true, true, true, false, false, false, false, true, true]
        );

        let scores = ColeKripke::default().score(&series(&[0; 3])).unwrap();
        assert!(scores.classifications.iter().all(|c| c.boundary_approximate));
    }

    #[test]
    fn test_deterministic() {
        let input = series(&[0, 120, 5000, 40, 0, 0, 900, 12, 3000, 0, 0]);
        let classifier = ColeKripke::default();
        assert_eq!(
            classifier.score(&input).unwrap(),
            classifier.score(&input).unwrap()
        );
    }

    #[test]
    fn test_classify_requires_one_series() {
        let classifier = ColeKripke::default();
        let err = classifier
            .classify(&[series(&[0; 5]), series(&[0; 5])])
            .unwrap_err();
        assert_eq!(
            err,
            ActigraphyError::SensorCountMismatch(Mismatch::Count {
                expected: 1,
                found: 2
            })
        );

        let report = classifier.classify(&[series(&[0; 5])]).unwrap();
        assert_eq!(report.algorithm, "cole-kripke");
        assert_eq!(report.len(), 5);
        assert_eq!(report.labels[0].source, LabelSource::Sensor(SensorId(1)));
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(
            ColeKripke::default().score(&series(&[])),
            Err(ActigraphyError::EmptySignal {
                stage: "Cole-Kripke classifier"
            })
        );
    }
}
