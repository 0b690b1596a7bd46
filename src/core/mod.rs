//! Counting and classification stages.
//!
//! This module contains:
//! - Resampling of raw streams onto a uniform grid
//! - Band-pass filtering and epoch aggregation into activity counts
//! - Cole-Kripke scoring and multi-sensor fusion
//! - Output tables and run summaries

pub mod classifier;
pub mod cole_kripke;
pub mod epochs;
pub mod filter;
pub mod fusion;
pub mod pipeline;
pub mod report;
pub mod resample;
pub mod signal;
pub mod summary;

// Re-export commonly used types
pub use classifier::{
    Classification, LabelSource, SensorScores, SleepClassifier, SleepIndex, SleepLabel,
    SleepReport,
};
pub use cole_kripke::{ColeKripke, ColeKripkeParams};
pub use epochs::{CountConfig, CountsSeries, EpochAggregator, EpochCount, DEFAULT_EPOCH_SECS};
pub use filter::{BandpassFilter, FilterConfig};
pub use fusion::{majority_vote, MultiSensorFusion, MAX_SENSORS};
pub use pipeline::{CountPipeline, PipelineOutput};
pub use report::{
    combined_counts_csv, combined_counts_table, counts_csv, counts_table, results_csv,
    results_table, CombinedCountsRow, CountsRow, ResultRow,
};
pub use resample::{resample, resample_uniform};
pub use signal::{FilteredSignal, UniformSignal};
pub use summary::{RunSummary, SensorActivity};
