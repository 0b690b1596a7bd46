//! End-to-end composition of the counting stages and the classifier.
//!
//! ```text
//! raw ──▶ resample(raw rate) ──▶ low-pass + resample(filter rate)
//!     ──▶ band-pass ──▶ resample(count rate) ──▶ epoch counts ──▶ classifier
//! ```
//!
//! Sensors are independent until classification, so their count pipelines may
//! run on scoped threads. Results are joined in input order before the
//! classifier sees them.

use crate::config::{AlgorithmMode, PipelineConfig};
use crate::core::classifier::{SleepClassifier, SleepReport};
use crate::core::cole_kripke::ColeKripke;
use crate::core::epochs::{CountsSeries, EpochAggregator};
use crate::core::filter::{lowpass, BandpassFilter};
use crate::core::fusion::{MultiSensorFusion, MAX_SENSORS};
use crate::core::resample::{resample, resample_uniform};
use crate::core::signal::{FilteredSignal, UniformSignal};
use crate::error::{ActigraphyError, Mismatch};
use crate::input::SensorInput;
use std::collections::HashSet;

/// Counts and labels of one run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub counts: Vec<CountsSeries>,
    pub report: SleepReport,
}

/// Runs raw sensor recordings through counting and classification.
#[derive(Debug, Clone, Default)]
pub struct CountPipeline {
    config: PipelineConfig,
}

impl CountPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Activity counts of a single sensor.
    pub fn counts(&self, input: &SensorInput) -> Result<CountsSeries, ActigraphyError> {
        let config = &self.config;

        let uniform = resample(input.sensor, &input.samples, config.raw_rate_hz)?;
        let at_filter_rate = self.to_filter_rate(uniform)?;

        let filtered = BandpassFilter::new(config.filter.clone()).apply(&at_filter_rate)?;
        let counted = if config.count_rate_hz == filtered.signal().rate_hz {
            filtered
        } else {
            // Content is already below the band-pass corner, so no further
            // anti-alias stage is needed here.
            FilteredSignal::from_filtered(resample_uniform(
                filtered.signal(),
                config.count_rate_hz,
            )?)
        };

        EpochAggregator::new(config.epoch_secs(), config.counts.clone()).aggregate(&counted)
    }

    fn to_filter_rate(&self, uniform: UniformSignal) -> Result<UniformSignal, ActigraphyError> {
        let config = &self.config;
        if config.filter_rate_hz == uniform.rate_hz {
            return Ok(uniform);
        }
        if config.filter_rate_hz < uniform.rate_hz {
            let smoothed = lowpass(&uniform, config.anti_alias_cutoff_hz, config.filter.order)?;
            return resample_uniform(&smoothed, config.filter_rate_hz);
        }
        resample_uniform(&uniform, config.filter_rate_hz)
    }

    /// Activity counts of every sensor, in input order.
    ///
    /// Accepts one to four sensors with distinct ids.
    pub fn counts_all(&self, inputs: &[SensorInput]) -> Result<Vec<CountsSeries>, ActigraphyError> {
        if inputs.is_empty() || inputs.len() > MAX_SENSORS {
            return Err(Mismatch::Count {
                expected: if inputs.is_empty() { 1 } else { MAX_SENSORS },
                found: inputs.len(),
            }
            .into());
        }
        let mut seen = HashSet::new();
        for input in inputs {
            if !seen.insert(input.sensor) {
                return Err(Mismatch::DuplicateSensor(input.sensor).into());
            }
        }

        if !self.config.parallel || inputs.len() == 1 {
            return inputs.iter().map(|input| self.counts(input)).collect();
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|input| scope.spawn(move || self.counts(input)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    /// The classifier selected by the configured mode.
    pub fn classifier(&self) -> Box<dyn SleepClassifier + Send + Sync> {
        let cole_kripke = ColeKripke::new(self.config.cole_kripke.clone());
        match self.config.mode {
            AlgorithmMode::Single => Box::new(cole_kripke),
            AlgorithmMode::Multi => Box::new(MultiSensorFusion::new(
                cole_kripke,
                self.config.required_sensors,
            )),
        }
    }

    /// Count every sensor and classify the result.
    pub fn run(&self, inputs: &[SensorInput]) -> Result<PipelineOutput, ActigraphyError> {
        let counts = self.counts_all(inputs)?;
        let report = self.classifier().classify(&counts)?;
        Ok(PipelineOutput { counts, report })
    }
}
