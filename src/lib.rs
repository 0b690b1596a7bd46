//! Actigraphy sleep scoring: accelerometer recordings to activity counts to
//! sleep/wake labels.
//!
//! Raw tri-axial exports from up to four body-worn sensors are resampled onto
//! a uniform grid, band-pass filtered, rectified and summed into 60-second
//! activity counts. Each minute is then scored as sleep (`S`) or wake (`W`)
//! with the Cole-Kripke rule, either for one sensor or fused across limbs by
//! majority vote.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         CountPipeline                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌────────────┐  │
//! │  │ Resampler │──▶│ Band-pass │──▶│  Epochs   │──▶│ Classifier │  │
//! │  │ (uniform) │   │ (0.29-1.63│   │ (60s sums)│   │ (CK/fused) │  │
//! │  └───────────┘   │    Hz)    │   └───────────┘   └────────────┘  │
//! │                  └───────────┘         │                │         │
//! │                                        ▼                ▼         │
//! │                                 ┌────────────┐   ┌────────────┐   │
//! │                                 │Counts table│   │  Results   │   │
//! │                                 └────────────┘   └────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use actigraphy_sleep::{input, CountPipeline, PipelineConfig, SensorId, SensorInput};
//!
//! let text = std::fs::read_to_string("wrist.csv").unwrap();
//! let samples = input::parse_raw_csv(&text, input::DEFAULT_TIMESTAMP_FORMAT).unwrap();
//!
//! let pipeline = CountPipeline::new(PipelineConfig::default());
//! let output = pipeline.run(&[SensorInput::new(SensorId(1), samples)]).unwrap();
//! println!("{} epochs scored", output.report.len());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod input;

// Re-export key types at crate root for convenience
pub use config::{AlgorithmMode, ConfigError, PipelineConfig};
pub use core::{
    ColeKripke, CountPipeline, CountsSeries, MultiSensorFusion, PipelineOutput, RunSummary,
    SleepClassifier, SleepLabel, SleepReport,
};
pub use error::{ActigraphyError, Mismatch};
pub use input::{RawSample, SensorId, SensorInput};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
