//! Demonstration of the counting and scoring pipeline on a synthetic night.
//!
//! This example shows how to:
//! 1. Build raw recordings for four limbs
//! 2. Compute per-sensor activity counts
//! 3. Score each minute with single-sensor and fused Cole-Kripke
//! 4. Render the results table and a run summary
//!
//! Run with: cargo run --example synthetic_night

use actigraphy_sleep::{
    config::{AlgorithmMode, PipelineConfig},
    core::{combined_counts_csv, combined_counts_table, results_csv, CountPipeline, RunSummary},
    input::{RawSample, SensorId, SensorInput},
};
use chrono::{Duration, TimeZone, Utc};

const RATE_HZ: i64 = 100;
const MINUTES: i64 = 30;

/// A lying-still limb with a 1 Hz, `amplitude` g movement during `restless`
/// minutes.
fn limb(sensor: u8, restless: std::ops::Range<i64>, amplitude: f64) -> SensorInput {
    let start = Utc
        .with_ymd_and_hms(2025, 2, 3, 23, 0, 0)
        .single()
        .unwrap_or_default();
    let period_us = 1_000_000 / RATE_HZ;

    let samples = (0..MINUTES * 60 * RATE_HZ)
        .map(|k| {
            let t = k as f64 / RATE_HZ as f64;
            let minute = k / (60 * RATE_HZ);
            let movement = if restless.contains(&minute) {
                amplitude * (2.0 * std::f64::consts::PI * t).sin()
            } else {
                0.0
            };
            RawSample::new(
                start + Duration::microseconds(k * period_us),
                0.05 + movement,
                -0.02 + 0.5 * movement,
                0.99,
            )
        })
        .collect();

    SensorInput::new(SensorId(sensor), samples)
}

fn main() {
    println!("Actigraphy Sleep - Synthetic Night Demo");
    println!("=======================================");
    println!();

    // Wrists turn over around minute 12, one ankle kicks around minute 20.
    let inputs = vec![
        limb(1, 12..14, 0.6),
        limb(2, 12..14, 0.5),
        limb(3, 20..21, 0.8),
        limb(4, 0..0, 0.0),
    ];
    println!(
        "Generated {} sensors x {} samples ({} min at {} Hz)",
        inputs.len(),
        inputs[0].samples.len(),
        MINUTES,
        RATE_HZ
    );
    println!();

    // Single-sensor scoring of the dominant wrist
    let single = CountPipeline::new(PipelineConfig::default());
    match single.run(&inputs[..1]) {
        Ok(run) => {
            println!("{}", RunSummary::new(&run.report, &run.counts).summary());
            println!();
        }
        Err(e) => {
            eprintln!("Single-sensor run failed: {e}");
            return;
        }
    }

    // Fused scoring over all four limbs
    let multi = CountPipeline::new(PipelineConfig {
        mode: AlgorithmMode::Multi,
        ..PipelineConfig::default()
    });
    let run = match multi.run(&inputs) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Multi-sensor run failed: {e}");
            return;
        }
    };

    match combined_counts_table(&run.counts).map(|rows| combined_counts_csv(&rows)) {
        Ok(Ok(csv)) => {
            println!("Combined counts:");
            print!("{csv}");
            println!();
        }
        Ok(Err(e)) => eprintln!("Could not render counts: {e}"),
        Err(e) => eprintln!("Could not join counts: {e}"),
    }

    match results_csv(&run.report) {
        Ok(csv) => {
            println!("Results:");
            print!("{csv}");
            println!();
        }
        Err(e) => eprintln!("Could not render results: {e}"),
    }
    println!("{}", RunSummary::new(&run.report, &run.counts).summary());
}
