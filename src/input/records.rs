//! Parsing of headerless `timestamp,x,y,z` sensor exports.

use crate::input::types::RawSample;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;

/// Default timestamp layout of sensor exports, e.g. `2025-02-03 21:13:10.260`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Errors raised while parsing raw records.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// The reader could not decode a record.
    Csv { line: usize, message: String },
    /// Wrong number of fields on a line.
    FieldCount { line: usize, found: usize },
    /// A timestamp could not be parsed.
    Timestamp { line: usize, value: String },
    /// An acceleration value is not a finite number.
    Value { line: usize, value: String },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Csv { line, message } => write!(f, "line {line}: {message}"),
            InputError::FieldCount { line, found } => {
                write!(f, "line {line}: expected 4 fields, found {found}")
            }
            InputError::Timestamp { line, value } => {
                write!(f, "line {line}: unparseable timestamp '{value}'")
            }
            InputError::Value { line, value } => {
                write!(f, "line {line}: invalid acceleration '{value}'")
            }
        }
    }
}

impl std::error::Error for InputError {}

impl From<csv::Error> for InputError {
    fn from(err: csv::Error) -> Self {
        InputError::Csv {
            line: err.position().map_or(0, |p| p.line() as usize),
            message: err.to_string(),
        }
    }
}

/// Parse a headerless CSV export held in memory.
pub fn parse_raw_csv(text: &str, timestamp_format: &str) -> Result<Vec<RawSample>, InputError> {
    read_raw_csv(text.as_bytes(), timestamp_format)
}

/// Read a headerless CSV export into raw samples.
///
/// Timestamps are either date-times in `timestamp_format` or plain numbers,
/// which are read as seconds since the Unix epoch. Blank lines are skipped and
/// accelerations must be finite. Ordering is not checked here; the resampler
/// rejects decreasing timestamps.
pub fn read_raw_csv<R: Read>(
    reader: R,
    timestamp_format: &str,
) -> Result<Vec<RawSample>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line() as usize);
        samples.push(parse_record(&record, line, timestamp_format)?);
    }

    Ok(samples)
}

fn parse_record(
    record: &StringRecord,
    line: usize,
    timestamp_format: &str,
) -> Result<RawSample, InputError> {
    if record.len() != 4 {
        return Err(InputError::FieldCount {
            line,
            found: record.len(),
        });
    }

    let timestamp =
        parse_timestamp(&record[0], timestamp_format).ok_or_else(|| InputError::Timestamp {
            line,
            value: record[0].to_string(),
        })?;

    let mut axes = [0.0f64; 3];
    for (axis, field) in axes.iter_mut().zip(record.iter().skip(1)) {
        *axis = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| InputError::Value {
                line,
                value: field.to_string(),
            })?;
    }

    Ok(RawSample::new(timestamp, axes[0], axes[1], axes[2]))
}

/// Parse one timestamp field.
///
/// Some firmware writes a seconds field of 60 or more at minute rollover;
/// those are clamped to `59.999` so the row stays in its minute.
pub fn parse_timestamp(field: &str, format: &str) -> Option<DateTime<Utc>> {
    if let Ok(secs) = field.parse::<f64>() {
        if !secs.is_finite() {
            return None;
        }
        let nanos = (secs * 1e9).round() as i64;
        return Some(DateTime::UNIX_EPOCH + Duration::nanoseconds(nanos));
    }

    let clamped = clamp_overflowing_seconds(field);
    let text = clamped.as_deref().unwrap_or(field);
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .map(|naive| naive.and_utc())
}

fn clamp_overflowing_seconds(field: &str) -> Option<String> {
    let (prefix, seconds) = field.rsplit_once(':')?;
    let value: f64 = seconds.parse().ok()?;
    if value >= 60.0 {
        Some(format!("{prefix}:59.999"))
    } else {
        None
    }
}
