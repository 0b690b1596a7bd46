//! Integration tests for the counting and scoring pipeline

use actigraphy_sleep::config::{AlgorithmMode, PipelineConfig};
use actigraphy_sleep::core::{results_csv, CountPipeline, RunSummary, SleepLabel};
use actigraphy_sleep::error::{ActigraphyError, Mismatch};
use actigraphy_sleep::input::{parse_raw_csv, InputError, RawSample, SensorId, SensorInput};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::ops::Range;

fn night_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 3, 23, 0, 0).unwrap()
}

/// `minutes` of 100 Hz data: a constant gravity offset plus a 1 Hz movement of
/// `amplitude` g during the `moving` minutes.
fn recording(sensor: u8, minutes: i64, moving: Range<i64>, amplitude: f64) -> SensorInput {
    let samples = (0..minutes * 6000)
        .map(|k| {
            let t = k as f64 / 100.0;
            let movement = if moving.contains(&(k / 6000)) {
                amplitude * (2.0 * std::f64::consts::PI * t).sin()
            } else {
                0.0
            };
            RawSample::new(
                night_start() + Duration::milliseconds(k * 10),
                0.1 + movement,
                -0.05 + 0.5 * movement,
                0.98,
            )
        })
        .collect();
    SensorInput::new(SensorId(sensor), samples)
}

fn multi_pipeline() -> CountPipeline {
    CountPipeline::new(PipelineConfig {
        mode: AlgorithmMode::Multi,
        ..PipelineConfig::default()
    })
}

#[test]
fn test_still_recording_end_to_end() {
    let output = CountPipeline::default()
        .run(&[recording(1, 10, 0..0, 0.0)])
        .unwrap();

    assert_eq!(output.counts.len(), 1);
    assert_eq!(output.counts[0].len(), 10);
    assert!(output.counts[0].epochs.iter().all(|e| e.count == 0));
    assert_eq!(output.counts[0].start(), Some(night_start()));

    let report = &output.report;
    assert_eq!(report.len(), 10);
    assert!(report.labels.iter().all(|c| c.label == SleepLabel::Sleep));

    let flags: Vec<bool> = report
        .labels
        .iter()
        .map(|c| c.boundary_approximate)
        .collect();
    assert_eq!(
        flags,
        vec![true, true, true, true, false, false, false, false, true, true]
    );
}

#[test]
fn test_movement_scores_wake() {
    let output = CountPipeline::default()
        .run(&[recording(1, 10, 4..6, 0.6)])
        .unwrap();
    let counts = &output.counts[0];

    assert!(counts.epochs[4].count > 1000);
    assert!(counts.epochs[5].count > 1000);
    assert_eq!(counts.epochs[0].count, 0);

    assert_eq!(output.report.labels[4].label, SleepLabel::Wake);
    assert_eq!(output.report.labels[5].label, SleepLabel::Wake);
    assert_eq!(output.report.labels[0].label, SleepLabel::Sleep);

    let summary = RunSummary::new(&output.report, &output.counts);
    assert!(summary.wake_epochs >= 2);
    assert!(summary.sleep_efficiency < 1.0);
}

#[test]
fn test_four_sensor_tie_is_wake() {
    let inputs = vec![
        recording(1, 10, 4..5, 0.6),
        recording(2, 10, 4..5, 0.6),
        recording(3, 10, 0..0, 0.0),
        recording(4, 10, 0..0, 0.0),
    ];
    let output = multi_pipeline().run(&inputs).unwrap();
    let report = &output.report;

    assert_eq!(report.sensors.len(), 4);
    assert_eq!(report.sensors[0].classifications[4].label, SleepLabel::Wake);
    assert_eq!(report.sensors[3].classifications[4].label, SleepLabel::Sleep);
    assert_eq!(report.labels[4].label, SleepLabel::Wake);
}

#[test]
fn test_four_sensor_majority_sleep() {
    let inputs = vec![
        recording(1, 10, 4..5, 0.6),
        recording(2, 10, 0..0, 0.0),
        recording(3, 10, 0..0, 0.0),
        recording(4, 10, 0..0, 0.0),
    ];
    let output = multi_pipeline().run(&inputs).unwrap();

    assert_eq!(output.report.sensors[0].classifications[4].label, SleepLabel::Wake);
    assert_eq!(output.report.labels[4].label, SleepLabel::Sleep);

    let csv = results_csv(&output.report).unwrap();
    assert!(csv.starts_with("dataTimestamp,sleep_index_1,sleep_index_2"));
    assert_eq!(csv.lines().count(), 11);
}

#[test]
fn test_multi_mode_rejects_three_sensors() {
    let inputs: Vec<SensorInput> = (1..=3).map(|id| recording(id, 2, 0..0, 0.0)).collect();
    assert_eq!(
        multi_pipeline().run(&inputs).unwrap_err(),
        ActigraphyError::SensorCountMismatch(Mismatch::Count {
            expected: 4,
            found: 3
        })
    );
}

#[test]
fn test_multi_mode_rejects_unequal_lengths() {
    let inputs = vec![
        recording(1, 10, 0..0, 0.0),
        recording(2, 10, 0..0, 0.0),
        recording(3, 9, 0..0, 0.0),
        recording(4, 10, 0..0, 0.0),
    ];
    assert_eq!(
        multi_pipeline().run(&inputs).unwrap_err(),
        ActigraphyError::SensorCountMismatch(Mismatch::EpochCount {
            sensor: SensorId(3),
            expected: 10,
            found: 9
        })
    );
}

#[test]
fn test_parsed_export_end_to_end() {
    // A still 10 Hz export, parsed from text.
    let mut text = String::new();
    for k in 0..(3 * 60 * 10) {
        let ts = night_start() + Duration::milliseconds(k * 100);
        text.push_str(&format!(
            "{},0.010,-0.020,0.990\n",
            ts.format("%Y-%m-%d %H:%M:%S%.3f")
        ));
    }
    let samples = parse_raw_csv(&text, "%Y-%m-%d %H:%M:%S%.f").unwrap();
    assert_eq!(samples.len(), 1800);

    let pipeline = CountPipeline::new(PipelineConfig {
        raw_rate_hz: 10.0,
        ..PipelineConfig::default()
    });
    let output = pipeline
        .run(&[SensorInput::new(SensorId(1), samples)])
        .unwrap();

    assert_eq!(output.counts[0].len(), 3);
    assert_eq!(output.report.count_label(SleepLabel::Sleep), 3);
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = std::env::temp_dir().join(format!(
        "actigraphy-sleep-pipeline-test-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, r#"{"mode": "multi", "required_sensors": 2}"#).unwrap();

    let config = PipelineConfig::load_from(&path).unwrap();
    assert_eq!(config.mode, AlgorithmMode::Multi);
    assert_eq!(config.raw_rate_hz, 100.0);

    let inputs = vec![recording(1, 6, 0..0, 0.0), recording(2, 6, 0..0, 0.0)];
    let output = CountPipeline::new(config).run(&inputs).unwrap();
    assert_eq!(output.report.algorithm, "cole-kripke-multi");
    assert_eq!(output.report.len(), 6);

    let _ = std::fs::remove_dir_all(&dir);
}

/// Text export of a still 10 Hz recording, with `bad` in place of the x value
/// at row `bad_row`.
fn export_with(minutes: i64, bad_row: i64, bad: &str) -> String {
    let mut text = String::new();
    for k in 0..(minutes * 60 * 10) {
        let ts = night_start() + Duration::milliseconds(k * 100);
        let x = if k == bad_row { bad.to_string() } else { "0.010".to_string() };
        text.push_str(&format!(
            "{},{x},-0.020,0.990\n",
            ts.format("%Y-%m-%d %H:%M:%S%.3f")
        ));
    }
    text
}

#[test]
fn test_nan_export_is_rejected() {
    let text = export_with(2, 300, "NaN");
    let err = parse_raw_csv(&text, "%Y-%m-%d %H:%M:%S%.f").unwrap_err();
    assert_eq!(
        err,
        InputError::Value {
            line: 301,
            value: "NaN".to_string()
        }
    );
}

#[test]
fn test_nan_sample_fails_pipeline() {
    let mut samples = parse_raw_csv(&export_with(2, -1, ""), "%Y-%m-%d %H:%M:%S%.f").unwrap();
    samples[300].x = f64::NAN;

    let pipeline = CountPipeline::new(PipelineConfig {
        raw_rate_hz: 10.0,
        ..PipelineConfig::default()
    });
    assert_eq!(
        pipeline
            .run(&[SensorInput::new(SensorId(1), samples)])
            .unwrap_err(),
        ActigraphyError::NonFiniteSample { index: 300 }
    );
}

#[test]
fn test_oversized_epoch_from_config() {
    let config =
        PipelineConfig::from_json(r#"{"epoch_duration": 10000000000, "raw_rate_hz": 10.0}"#)
            .unwrap();
    let samples = parse_raw_csv(&export_with(2, -1, ""), "%Y-%m-%d %H:%M:%S%.f").unwrap();

    assert_eq!(
        CountPipeline::new(config).counts(&SensorInput::new(SensorId(1), samples)),
        Err(ActigraphyError::InvalidEpochLength(10_000_000_000))
    );
}
