//! Actigraphy sleep scoring CLI
//!
//! Turns raw accelerometer exports into activity counts and sleep/wake labels.

use actigraphy_sleep::{
    config::{AlgorithmMode, PipelineConfig},
    core::{
        combined_counts_csv, combined_counts_table, counts_csv, counts_table, results_csv,
        results_table, CountPipeline, ResultRow, RunSummary, MAX_SENSORS,
    },
    input::{read_raw_csv, SensorId, SensorInput},
    VERSION,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "actigraphy")]
#[command(version = VERSION)]
#[command(about = "Activity counts and Cole-Kripke sleep/wake scoring", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute 60-second activity counts for each sensor
    Counts {
        /// Raw exports, one per sensor (at most four)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Sampling rate of the raw exports in Hz
        #[arg(long, short = 'r')]
        raw_rate: Option<f64>,

        /// Output directory
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },

    /// Score every epoch as sleep or wake
    Classify {
        /// Raw exports, one per sensor (at most four)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Algorithm mode (single/c or multi/cm)
        #[arg(long, short)]
        mode: Option<String>,

        /// Sampling rate of the raw exports in Hz
        #[arg(long, short = 'r')]
        raw_rate: Option<f64>,

        /// Output directory
        #[arg(long, short, default_value = ".")]
        output: PathBuf,

        /// Results format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// Show configuration
    Config {
        /// Write the effective configuration to the user config directory
        #[arg(long)]
        write: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// JSON results document.
#[derive(Serialize)]
struct ResultsDocument<'a> {
    summary: &'a RunSummary,
    epochs: Vec<ResultRow>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Counts {
            files,
            raw_rate,
            output,
        } => cmd_counts(config_path, &files, raw_rate, &output),
        Commands::Classify {
            files,
            mode,
            raw_rate,
            output,
            format,
        } => cmd_classify(config_path, &files, mode.as_deref(), raw_rate, &output, format),
        Commands::Config { write } => cmd_config(config_path, write),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PipelineConfig::load().context("loading config")?,
    };
    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Read one export per sensor; sensors are numbered from 1 in argument order.
fn read_inputs(files: &[PathBuf], timestamp_format: &str) -> Result<Vec<SensorInput>> {
    if files.len() > MAX_SENSORS {
        bail!(
            "at most {MAX_SENSORS} sensor files are supported, got {}",
            files.len()
        );
    }

    files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let sensor = SensorId(i as u8 + 1);
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            let samples = read_raw_csv(std::io::BufReader::new(file), timestamp_format)
                .with_context(|| format!("parsing {}", path.display()))?;
            info!(%sensor, file = %path.display(), samples = samples.len(), "loaded sensor");
            Ok(SensorInput::new(sensor, samples))
        })
        .collect()
}

fn write_output(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote output");
    Ok(path)
}

fn cmd_counts(
    config_path: Option<&Path>,
    files: &[PathBuf],
    raw_rate: Option<f64>,
    output: &Path,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(rate) = raw_rate {
        config.raw_rate_hz = rate;
    }

    let inputs = read_inputs(files, &config.timestamp_format)?;
    let pipeline = CountPipeline::new(config);
    let counts = pipeline.counts_all(&inputs)?;

    for series in &counts {
        info!(sensor = %series.sensor, epochs = series.len(), "counted");
        let csv = counts_csv(&counts_table(series))?;
        write_output(output, &format!("{}_counts.csv", series.sensor), &csv)?;
    }

    if counts.len() > 1 {
        let rows = combined_counts_table(&counts).context("joining sensor counts")?;
        write_output(output, "combined_counts.csv", &combined_counts_csv(&rows)?)?;
    }

    Ok(())
}

fn cmd_classify(
    config_path: Option<&Path>,
    files: &[PathBuf],
    mode: Option<&str>,
    raw_rate: Option<f64>,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(flag) = mode {
        let Some(mode) = AlgorithmMode::from_flag(flag) else {
            bail!("unknown mode '{flag}' (expected single, c, multi or cm)");
        };
        config.mode = mode;
    }
    if let Some(rate) = raw_rate {
        config.raw_rate_hz = rate;
    }

    let inputs = read_inputs(files, &config.timestamp_format)?;
    let pipeline = CountPipeline::new(config);
    let run = pipeline.run(&inputs)?;
    let summary = RunSummary::new(&run.report, &run.counts);

    match format {
        OutputFormat::Csv => {
            write_output(output, "results.csv", &results_csv(&run.report)?)?;
        }
        OutputFormat::Json => {
            let document = ResultsDocument {
                summary: &summary,
                epochs: results_table(&run.report),
            };
            let json = serde_json::to_string_pretty(&document)?;
            write_output(output, "results.json", &json)?;
        }
    }

    println!("{}", summary.summary());
    Ok(())
}

fn cmd_config(config_path: Option<&Path>, write: bool) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    if write {
        let path = config.save().context("saving config")?;
        println!();
        println!("Configuration written to {}", path.display());
    } else {
        println!();
        println!("Config file location: {}", PipelineConfig::config_path().display());
    }
    Ok(())
}
