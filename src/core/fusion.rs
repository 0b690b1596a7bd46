//! Multi-limb fusion of per-sensor Cole-Kripke labels.
//!
//! Every sensor is scored on its own; the combined label of an epoch is the
//! majority of the per-sensor labels, and a tie is scored as wake.

use crate::core::classifier::{
    Classification, LabelSource, SensorScores, SleepClassifier, SleepLabel, SleepReport,
};
use crate::core::cole_kripke::ColeKripke;
use crate::core::epochs::CountsSeries;
use crate::error::{ActigraphyError, Mismatch};
use std::collections::HashSet;

/// Largest number of sensors fused in one run.
pub const MAX_SENSORS: usize = 4;

/// Default sensor count for multi-limb recordings.
pub const DEFAULT_REQUIRED_SENSORS: usize = 4;

/// Cole-Kripke over several time-aligned sensors with majority-vote fusion.
#[derive(Debug, Clone)]
pub struct MultiSensorFusion {
    classifier: ColeKripke,
    required_sensors: usize,
}

impl MultiSensorFusion {
    pub fn new(classifier: ColeKripke, required_sensors: usize) -> Self {
        Self {
            classifier,
            required_sensors,
        }
    }

    pub fn required_sensors(&self) -> usize {
        self.required_sensors
    }

    /// Check sensor count, uniqueness and epoch alignment.
    pub fn validate(&self, series: &[CountsSeries]) -> Result<(), Mismatch> {
        if series.is_empty() || series.len() != self.required_sensors || series.len() > MAX_SENSORS
        {
            return Err(Mismatch::Count {
                expected: self.required_sensors,
                found: series.len(),
            });
        }

        check_alignment(series)
    }
}

/// Check that sensor ids are distinct and every series covers the same epochs
/// as the first one.
pub fn check_alignment(series: &[CountsSeries]) -> Result<(), Mismatch> {
    let mut seen = HashSet::new();
    for s in series {
        if !seen.insert(s.sensor) {
            return Err(Mismatch::DuplicateSensor(s.sensor));
        }
    }

    let Some((reference, rest)) = series.split_first() else {
        return Ok(());
    };
    for s in rest {
        if s.len() != reference.len() {
            return Err(Mismatch::EpochCount {
                sensor: s.sensor,
                expected: reference.len(),
                found: s.len(),
            });
        }
        if s.start() != reference.start() || s.epoch_secs != reference.epoch_secs {
            return Err(Mismatch::StartTime { sensor: s.sensor });
        }
    }

    Ok(())
}

/// Majority of `labels`; a tie (or no labels at all) is wake.
pub fn majority_vote(labels: impl IntoIterator<Item = SleepLabel>) -> SleepLabel {
    let (mut sleep, mut wake) = (0usize, 0usize);
    for label in labels {
        match label {
            SleepLabel::Sleep => sleep += 1,
            SleepLabel::Wake => wake += 1,
        }
    }
    if sleep > wake {
        SleepLabel::Sleep
    } else {
        SleepLabel::Wake
    }
}

impl SleepClassifier for MultiSensorFusion {
    fn name(&self) -> &'static str {
        "cole-kripke-multi"
    }

    fn classify(&self, series: &[CountsSeries]) -> Result<SleepReport, ActigraphyError> {
        self.validate(series)?;

        let sensors: Vec<SensorScores> = series
            .iter()
            .map(|s| self.classifier.score(s))
            .collect::<Result<_, _>>()?;

        let epochs = sensors[0].classifications.len();
        let labels = (0..epochs)
            .map(|i| {
                let reference = &sensors[0].classifications[i];
                Classification {
                    epoch_start: reference.epoch_start,
                    source: LabelSource::Combined,
                    label: majority_vote(sensors.iter().map(|s| s.classifications[i].label)),
                    boundary_approximate: reference.boundary_approximate,
                }
            })
            .collect();

        Ok(SleepReport {
            algorithm: self.name().to_string(),
            sensors,
            labels,
        })
    }
}
