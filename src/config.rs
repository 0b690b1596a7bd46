//! Configuration for the counting and classification pipeline.

use crate::core::cole_kripke::ColeKripkeParams;
use crate::core::epochs::{CountConfig, DEFAULT_EPOCH_SECS};
use crate::core::filter::FilterConfig;
use crate::core::fusion::DEFAULT_REQUIRED_SENSORS;
use crate::input::DEFAULT_TIMESTAMP_FORMAT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration: every constant the pipeline uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Nominal sampling rate of the raw exports (Hz)
    pub raw_rate_hz: f64,

    /// Rate the band-pass filter runs at (Hz)
    pub filter_rate_hz: f64,

    /// Rate samples are counted at (Hz)
    pub count_rate_hz: f64,

    /// Corner of the anti-alias low-pass applied before lowering the rate (Hz)
    pub anti_alias_cutoff_hz: f64,

    /// Length of one classification epoch
    #[serde(with = "epoch_seconds")]
    pub epoch_duration: Duration,

    /// Single-sensor or multi-sensor scoring
    pub mode: AlgorithmMode,

    /// Sensors required in multi-sensor mode
    pub required_sensors: usize,

    pub filter: FilterConfig,

    pub counts: CountConfig,

    pub cole_kripke: ColeKripkeParams,

    /// chrono format of the timestamp column in raw exports
    pub timestamp_format: String,

    /// Run per-sensor count pipelines on separate threads
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_rate_hz: 100.0,
            filter_rate_hz: 30.0,
            count_rate_hz: 10.0,
            anti_alias_cutoff_hz: 14.9,
            epoch_duration: Duration::from_secs(DEFAULT_EPOCH_SECS as u64),
            mode: AlgorithmMode::Single,
            required_sensors: DEFAULT_REQUIRED_SENSORS,
            filter: FilterConfig::default(),
            counts: CountConfig::default(),
            cole_kripke: ColeKripkeParams::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Parse configuration from JSON; missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let config_path = Self::config_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("actigraphy-sleep")
            .join("config.json")
    }

    /// Epoch length in whole seconds, saturating at `i64::MAX`.
    ///
    /// Lengths too large to express in nanoseconds are rejected by the
    /// aggregator rather than here.
    pub fn epoch_secs(&self) -> i64 {
        i64::try_from(self.epoch_duration.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Which classifier a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmMode {
    /// Cole-Kripke on one sensor
    Single,
    /// Cole-Kripke per sensor with majority-vote fusion
    Multi,
}

impl AlgorithmMode {
    /// Parse a mode flag. Accepts `single`/`c` and `multi`/`cm`, any case.
    pub fn from_flag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" | "c" => Some(AlgorithmMode::Single),
            "multi" | "cm" => Some(AlgorithmMode::Multi),
            _ => None,
        }
    }
}

/// Errors reading or writing the pipeline config file.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file or its directory could not be read or written.
    Io { path: PathBuf, message: String },
    /// The file is not valid pipeline-config JSON.
    Parse(String),
    Serialize(String),
}

impl ConfigError {
    fn io(path: &Path, err: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "actigraphy config {}: {message}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid actigraphy config: {e}"),
            ConfigError::Serialize(e) => write!(f, "cannot encode actigraphy config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Epoch length stored as whole seconds.
mod epoch_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(epoch: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        epoch.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(AlgorithmMode::from_flag("single"), Some(AlgorithmMode::Single));
        assert_eq!(AlgorithmMode::from_flag("C"), Some(AlgorithmMode::Single));
        assert_eq!(AlgorithmMode::from_flag("CM"), Some(AlgorithmMode::Multi));
        assert_eq!(AlgorithmMode::from_flag(" multi "), Some(AlgorithmMode::Multi));
        assert_eq!(AlgorithmMode::from_flag("choi"), None);
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.epoch_duration, Duration::from_secs(60));
        assert_eq!(config.epoch_secs(), 60);
        assert_eq!(config.required_sensors, 4);
        assert_eq!(config.filter.low_cutoff_hz, 0.29);
        assert_eq!(config.filter.high_cutoff_hz, 1.63);
        assert_eq!(config.cole_kripke.threshold, 1.0);
        assert_eq!(config.mode, AlgorithmMode::Single);
    }

    #[test]
    fn test_json_round_trip_and_partial() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"epoch_duration\":60"));
        assert!(json.contains("\"mode\":\"single\""));
        assert_eq!(PipelineConfig::from_json(&json).unwrap(), config);

        let partial = PipelineConfig::from_json(r#"{"raw_rate_hz": 50.0, "mode": "multi"}"#).unwrap();
        assert_eq!(partial.raw_rate_hz, 50.0);
        assert_eq!(partial.mode, AlgorithmMode::Multi);
        assert_eq!(partial.filter, FilterConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PipelineConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_errors_name_config_file() {
        let missing = std::env::temp_dir()
            .join(format!("actigraphy-config-missing-{}", std::process::id()))
            .join("config.json");
        let err = PipelineConfig::load_from(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { ref path, .. } if path == &missing));
        assert!(err.to_string().starts_with("actigraphy config "));
        assert!(err.to_string().contains("config.json"));

        let err = PipelineConfig::from_json("[]").unwrap_err();
        assert!(err.to_string().starts_with("invalid actigraphy config"));
    }

    #[test]
    fn test_save_to_and_load_from() {
        let dir = std::env::temp_dir().join(format!("actigraphy-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");
        let config = PipelineConfig {
            mode: AlgorithmMode::Multi,
            required_sensors: 2,
            ..PipelineConfig::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(PipelineConfig::load_from(&path).unwrap(), config);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_huge_epoch_saturates() {
        let config = PipelineConfig {
            epoch_duration: Duration::from_secs(u64::MAX),
            ..PipelineConfig::default()
        };
        assert_eq!(config.epoch_secs(), i64::MAX);
    }
}
