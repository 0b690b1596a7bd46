//! Raw sensor input: record types and parsing of headerless exports.

pub mod records;
pub mod types;

// Re-export commonly used types
pub use records::{
    parse_raw_csv, parse_timestamp, read_raw_csv, InputError, DEFAULT_TIMESTAMP_FORMAT,
};
pub use types::{RawSample, SensorId, SensorInput};
