//! Regularization of raw sample streams onto a uniform time grid.
//!
//! Raw exports are sampled at a nominal rate, but timestamps jitter and
//! consecutive files may overlap. The resampler interpolates linearly between
//! the two raw samples that bracket each grid point. The grid is anchored at the
//! first raw timestamp and never extends past the last one.

use crate::core::signal::UniformSignal;
use crate::error::ActigraphyError;
use crate::input::types::seconds_between;
use crate::input::{RawSample, SensorId};

/// Slack, in sample periods, for grid points that land on the last raw sample
/// but compute a hair past it.
const GRID_EPSILON: f64 = 1e-6;

/// Resample a raw recording onto a grid of `rate_hz` samples per second.
pub fn resample(
    sensor: SensorId,
    samples: &[RawSample],
    rate_hz: f64,
) -> Result<UniformSignal, ActigraphyError> {
    validate_rate(rate_hz)?;
    let first = samples.first().ok_or(ActigraphyError::EmptySignal {
        stage: "resampler",
    })?;

    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(ActigraphyError::NonMonotonicTimestamp { index: index + 1 });
        }
    }
    // A single NaN would spread through the IIR filter to every sample.
    if let Some(index) = samples
        .iter()
        .position(|s| !(s.x.is_finite() && s.y.is_finite() && s.z.is_finite()))
    {
        return Err(ActigraphyError::NonFiniteSample { index });
    }

    let offsets: Vec<f64> = samples
        .iter()
        .map(|s| seconds_between(first.timestamp, s.timestamp))
        .collect();
    let x: Vec<f64> = samples.iter().map(|s| s.x).collect();
    let y: Vec<f64> = samples.iter().map(|s| s.y).collect();
    let z: Vec<f64> = samples.iter().map(|s| s.z).collect();

    let [x, y, z] = interpolate(&offsets, [&x, &y, &z], rate_hz);
    Ok(UniformSignal::new(sensor, first.timestamp, rate_hz, x, y, z))
}

/// Re-grid an already uniform signal to `rate_hz`.
///
/// Uses the same interpolation and end rule as [`resample`], so re-gridding a
/// signal at its own rate returns it unchanged.
pub fn resample_uniform(
    signal: &UniformSignal,
    rate_hz: f64,
) -> Result<UniformSignal, ActigraphyError> {
    validate_rate(rate_hz)?;
    if signal.is_empty() {
        return Err(ActigraphyError::EmptySignal {
            stage: "resampler",
        });
    }

    let offsets: Vec<f64> = (0..signal.len())
        .map(|k| k as f64 / signal.rate_hz)
        .collect();
    let [x, y, z] = interpolate(&offsets, signal.axes(), rate_hz);
    Ok(UniformSignal::new(
        signal.sensor,
        signal.start,
        rate_hz,
        x,
        y,
        z,
    ))
}

fn validate_rate(rate_hz: f64) -> Result<(), ActigraphyError> {
    if rate_hz.is_finite() && rate_hz > 0.0 {
        Ok(())
    } else {
        Err(ActigraphyError::InvalidRate(rate_hz))
    }
}

/// Linearly interpolate three axis columns, sampled at non-decreasing
/// `offsets` (seconds), onto the grid `k / rate_hz`.
fn interpolate(offsets: &[f64], axes: [&[f64]; 3], rate_hz: f64) -> [Vec<f64>; 3] {
    let last = offsets[offsets.len() - 1];
    let grid_len = (last * rate_hz + GRID_EPSILON).floor() as usize + 1;

    let mut out = [
        Vec::with_capacity(grid_len),
        Vec::with_capacity(grid_len),
        Vec::with_capacity(grid_len),
    ];

    // Walk the raw samples once; `j` is the last sample at or before `t`.
    // Repeated timestamps collapse onto the latest of them.
    let mut j = 0;
    for k in 0..grid_len {
        let t = k as f64 / rate_hz;
        while j + 1 < offsets.len() && offsets[j + 1] <= t {
            j += 1;
        }

        if j + 1 == offsets.len() {
            for (col, axis) in out.iter_mut().zip(axes) {
                col.push(axis[j]);
            }
            continue;
        }

        let frac = (t - offsets[j]) / (offsets[j + 1] - offsets[j]);
        for (col, axis) in out.iter_mut().zip(axes) {
            col.push(axis[j] + frac * (axis[j + 1] - axis[j]));
        }
    }

    out
}
