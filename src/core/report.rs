//! Output tables: per-sensor counts, combined counts and sleep/wake results.
//!
//! Rows are typed and serde-serializable; the CSV renderers produce the
//! column layout downstream tooling expects (`dataTimestamp` first, sensor
//! columns suffixed with the sensor number).

use crate::core::classifier::{SleepLabel, SleepReport};
use crate::core::epochs::CountsSeries;
use crate::core::fusion::check_alignment;
use crate::error::ActigraphyError;
use crate::input::SensorId;
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::{Deserialize, Serialize};

/// Timestamp layout of every table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// One epoch of one sensor's counts table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsRow {
    pub epoch_start: DateTime<Utc>,
    pub axis1: u64,
    pub axis2: u64,
    pub axis3: u64,
    pub vm: u64,
}

/// Counts table of a single sensor.
pub fn counts_table(series: &CountsSeries) -> Vec<CountsRow> {
    series
        .epochs
        .iter()
        .map(|e| CountsRow {
            epoch_start: e.epoch_start,
            axis1: e.axis_counts[0],
            axis2: e.axis_counts[1],
            axis3: e.axis_counts[2],
            vm: e.count,
        })
        .collect()
}

/// Finish an in-memory writer and return its text.
fn into_string(writer: Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Render a counts table as CSV.
pub fn counts_csv(rows: &[CountsRow]) -> Result<String, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["dataTimestamp", "axis1", "axis2", "axis3", "vm"])?;
    for row in rows {
        writer.write_record([
            format_timestamp(&row.epoch_start),
            row.axis1.to_string(),
            row.axis2.to_string(),
            row.axis3.to_string(),
            row.vm.to_string(),
        ])?;
    }
    into_string(writer)
}

/// One epoch of the combined counts table; `sensors` follows input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedCountsRow {
    pub epoch_start: DateTime<Utc>,
    pub sensors: Vec<SensorId>,
    pub axis_counts: Vec<[u64; 3]>,
    pub vm: Vec<u64>,
}

/// Join several sensors' counts by epoch index.
///
/// The series must be time-aligned, otherwise the join would pair
/// different minutes.
pub fn combined_counts_table(
    series: &[CountsSeries],
) -> Result<Vec<CombinedCountsRow>, ActigraphyError> {
    check_alignment(series)?;
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };

    let sensors: Vec<SensorId> = series.iter().map(|s| s.sensor).collect();
    Ok((0..first.len())
        .map(|i| CombinedCountsRow {
            epoch_start: first.epochs[i].epoch_start,
            sensors: sensors.clone(),
            axis_counts: series.iter().map(|s| s.epochs[i].axis_counts).collect(),
            vm: series.iter().map(|s| s.epochs[i].count).collect(),
        })
        .collect())
}

/// Render the combined counts table as CSV, axis-major
/// (`axis1_1, axis1_2, …, axis2_1, …, vm_n`).
pub fn combined_counts_csv(rows: &[CombinedCountsRow]) -> Result<String, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());
    let Some(first) = rows.first() else {
        writer.write_record(["dataTimestamp"])?;
        return into_string(writer);
    };

    let mut header = vec!["dataTimestamp".to_string()];
    for column in ["axis1", "axis2", "axis3", "vm"] {
        header.extend(first.sensors.iter().map(|sensor| format!("{column}_{}", sensor.0)));
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![format_timestamp(&row.epoch_start)];
        for axis in 0..3 {
            record.extend(row.axis_counts.iter().map(|counts| counts[axis].to_string()));
        }
        record.extend(row.vm.iter().map(u64::to_string));
        writer.write_record(&record)?;
    }
    into_string(writer)
}

/// One epoch of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub epoch_start: DateTime<Utc>,
    /// Sleep index per sensor, in report order
    pub sleep_indices: Vec<f64>,
    /// Label per sensor, in report order
    pub sensor_labels: Vec<SleepLabel>,
    /// Final label (the sensor's own, or the fused one)
    pub label: SleepLabel,
    pub boundary_approximate: bool,
}

/// Flatten a report into one row per epoch.
pub fn results_table(report: &SleepReport) -> Vec<ResultRow> {
    report
        .labels
        .iter()
        .enumerate()
        .map(|(i, final_label)| ResultRow {
            epoch_start: final_label.epoch_start,
            sleep_indices: report
                .sensors
                .iter()
                .map(|s| s.sleep_indices[i].value)
                .collect(),
            sensor_labels: report
                .sensors
                .iter()
                .map(|s| s.classifications[i].label)
                .collect(),
            label: final_label.label,
            boundary_approximate: final_label.boundary_approximate,
        })
        .collect()
}

/// Render a report as CSV.
///
/// Single- and multi-sensor reports share one layout: a sleep index column per
/// sensor, then the final label. Per-sensor label columns are added only when
/// there is more than one sensor.
pub fn results_csv(report: &SleepReport) -> Result<String, csv::Error> {
    let sensors: Vec<SensorId> = report.sensors.iter().map(|s| s.sensor).collect();
    let per_sensor_labels = sensors.len() > 1;

    let mut header = vec!["dataTimestamp".to_string()];
    header.extend(sensors.iter().map(|s| format!("sleep_index_{}", s.0)));
    if per_sensor_labels {
        header.extend(sensors.iter().map(|s| format!("sleep_{}", s.0)));
    }
    header.extend(["label".to_string(), "boundary_approximate".to_string()]);

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(&header)?;

    for row in results_table(report) {
        let mut record = vec![format_timestamp(&row.epoch_start)];
        record.extend(row.sleep_indices.iter().map(|v| format!("{v:.4}")));
        if per_sensor_labels {
            record.extend(row.sensor_labels.iter().map(SleepLabel::to_string));
        }
        record.push(row.label.to_string());
        record.push(row.boundary_approximate.to_string());
        writer.write_record(&record)?;
    }
    into_string(writer)
}
