//! Zero-phase Butterworth filtering of tri-axial signals.
//!
//! The band-pass used for count emulation is a high-pass at the low cutoff
//! cascaded with a low-pass at the high cutoff, each realised as second-order
//! sections from the bilinear transform. Filtering runs forward then backward
//! over an odd-reflected extension of the signal, with every section started
//! in its steady state for the first sample. Output length always equals
//! input length, and a constant offset (gravity) filters to zero.

use crate::core::signal::{FilteredSignal, UniformSignal};
use crate::error::ActigraphyError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Band-pass parameters.
///
/// Defaults reproduce the ActiGraph count emulation band of 0.29–1.63 Hz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// High-pass corner in Hz; removes gravity and slow drift
    pub low_cutoff_hz: f64,
    /// Low-pass corner in Hz; removes non-movement vibration
    pub high_cutoff_hz: f64,
    /// Butterworth order of each of the two edges
    pub order: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_cutoff_hz: 0.29,
            high_cutoff_hz: 1.63,
            order: 4,
        }
    }
}

/// Band-pass filter applied independently to x, y and z.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    config: FilterConfig,
}

impl BandpassFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filter every axis of `signal`.
    pub fn apply(&self, signal: &UniformSignal) -> Result<FilteredSignal, ActigraphyError> {
        if signal.is_empty() {
            return Err(ActigraphyError::EmptySignal {
                stage: "bandpass filter",
            });
        }

        let FilterConfig {
            low_cutoff_hz,
            high_cutoff_hz,
            order,
        } = self.config;
        let nyquist = signal.rate_hz / 2.0;
        if !(low_cutoff_hz > 0.0 && low_cutoff_hz < high_cutoff_hz && high_cutoff_hz < nyquist) {
            return Err(ActigraphyError::InvalidCutoff {
                low_hz: low_cutoff_hz,
                high_hz: high_cutoff_hz,
                rate_hz: signal.rate_hz,
            });
        }

        let mut sections = butterworth(EdgeKind::HighPass, order, low_cutoff_hz, signal.rate_hz);
        sections.extend(butterworth(
            EdgeKind::LowPass,
            order,
            high_cutoff_hz,
            signal.rate_hz,
        ));

        Ok(FilteredSignal::from_filtered(map_axes(signal, &sections)))
    }
}

/// Zero-phase low-pass of every axis; used as the anti-alias stage before
/// lowering the sampling rate.
pub fn lowpass(
    signal: &UniformSignal,
    cutoff_hz: f64,
    order: usize,
) -> Result<UniformSignal, ActigraphyError> {
    if signal.is_empty() {
        return Err(ActigraphyError::EmptySignal {
            stage: "low-pass filter",
        });
    }
    if !(cutoff_hz > 0.0 && cutoff_hz < signal.rate_hz / 2.0) {
        return Err(ActigraphyError::InvalidCutoff {
            low_hz: 0.0,
            high_hz: cutoff_hz,
            rate_hz: signal.rate_hz,
        });
    }

    let sections = butterworth(EdgeKind::LowPass, order, cutoff_hz, signal.rate_hz);
    Ok(map_axes(signal, &sections))
}

fn map_axes(signal: &UniformSignal, sections: &[Biquad]) -> UniformSignal {
    let [x, y, z] = signal.axes().map(|axis| filtfilt(sections, axis));
    UniformSignal::new(signal.sensor, signal.start, signal.rate_hz, x, y, z)
}

#[derive(Debug, Clone, Copy)]
enum EdgeKind {
    LowPass,
    HighPass,
}

/// One second-order section, `a0` normalised to 1.
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    fn second_order(kind: EdgeKind, k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        let (b0, b1, b2) = match kind {
            EdgeKind::LowPass => (k2 * norm, 2.0 * k2 * norm, k2 * norm),
            EdgeKind::HighPass => (norm, -2.0 * norm, norm),
        };
        Self {
            b0,
            b1,
            b2,
            a1: 2.0 * (k2 - 1.0) * norm,
            a2: (1.0 - k / q + k2) * norm,
        }
    }

    fn first_order(kind: EdgeKind, k: f64) -> Self {
        let norm = 1.0 / (1.0 + k);
        let (b0, b1) = match kind {
            EdgeKind::LowPass => (k * norm, k * norm),
            EdgeKind::HighPass => (norm, -norm),
        };
        Self {
            b0,
            b1,
            b2: 0.0,
            a1: (k - 1.0) * norm,
            a2: 0.0,
        }
    }

    /// Gain at 0 Hz.
    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Transposed direct form II state that makes a constant input `level`
    /// produce its steady-state output from the first sample on.
    fn steady_state(&self, level: f64) -> [f64; 2] {
        let out = self.dc_gain() * level;
        let z2 = self.b2 * level - self.a2 * out;
        let z1 = out - self.b0 * level;
        [z1, z2]
    }

    fn step(&self, state: &mut [f64; 2], input: f64) -> f64 {
        let out = self.b0 * input + state[0];
        state[0] = self.b1 * input - self.a1 * out + state[1];
        state[1] = self.b2 * input - self.a2 * out;
        out
    }
}

/// Second-order sections of an `order`-pole Butterworth edge at `cutoff_hz`.
fn butterworth(kind: EdgeKind, order: usize, cutoff_hz: f64, rate_hz: f64) -> Vec<Biquad> {
    let order = order.max(1);
    let k = (PI * cutoff_hz / rate_hz).tan();

    let mut sections: Vec<Biquad> = (0..order / 2)
        .map(|pair| {
            let theta = (2 * pair + 1) as f64 * PI / (2 * order) as f64;
            Biquad::second_order(kind, k, 1.0 / (2.0 * theta.cos()))
        })
        .collect();
    if order % 2 == 1 {
        sections.push(Biquad::first_order(kind, k));
    }
    sections
}

/// Run the cascade over `input` starting from the steady state for `input[0]`.
fn run_cascade(sections: &[Biquad], input: &[f64]) -> Vec<f64> {
    let mut level = input[0];
    let mut states: Vec<[f64; 2]> = sections
        .iter()
        .map(|section| {
            let state = section.steady_state(level);
            level *= section.dc_gain();
            state
        })
        .collect();

    input
        .iter()
        .map(|&sample| {
            sections
                .iter()
                .zip(states.iter_mut())
                .fold(sample, |acc, (section, state)| section.step(state, acc))
        })
        .collect()
}

/// Forward-backward filtering with odd-reflection padding at both ends.
fn filtfilt(sections: &[Biquad], input: &[f64]) -> Vec<f64> {
    let n = input.len();
    let pad = (3 * (2 * sections.len() + 1)).min(n.saturating_sub(1));

    let first = input[0];
    let last = input[n - 1];
    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - input[i]));
    extended.extend_from_slice(input);
    extended.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i]));

    let mut forward = run_cascade(sections, &extended);
    forward.reverse();
    let mut backward = run_cascade(sections, &forward);
    backward.reverse();

    backward[pad..pad + n].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SensorId;
    use chrono::DateTime;

    fn signal_from(rate_hz: f64, f: impl Fn(f64) -> f64, len: usize) -> UniformSignal {
        let values: Vec<f64> = (0..len).map(|k| f(k as f64 / rate_hz)).collect();
        UniformSignal::new(
            SensorId(1),
            DateTime::UNIX_EPOCH,
            rate_hz,
            values.clone(),
            values.clone(),
            values,
        )
    }

    fn rms(values: &[f64]) -> f64 {
        (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
    }

    #[test]
    fn test_preserves_length() {
        let filter = BandpassFilter::new(FilterConfig::default());
        for len in [1, 2, 5, 27, 28, 100, 3001] {
            let signal = signal_from(30.0, |t| (t * 7.0).sin(), len);
            let filtered = filter.apply(&signal).unwrap();
            assert_eq!(filtered.len(), len);
            assert_eq!(filtered.signal().start, signal.start);
            assert_eq!(filtered.signal().rate_hz, signal.rate_hz);
        }
    }

    #[test]
    fn test_constant_offset_removed() {
        let filter = BandpassFilter::new(FilterConfig::default());
        let signal = signal_from(30.0, |_| 0.98, 1800);
        let filtered = filter.apply(&signal).unwrap();
        assert!(filtered.signal().x.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_passband_and_stopband() {
        let filter = BandpassFilter::new(FilterConfig::default());

        let in_band = signal_from(30.0, |t| (2.0 * PI * 0.8 * t).sin(), 3000);
        let out = filter.apply(&in_band).unwrap();
        // Ignore the edges; compare steady-state amplitude.
        let gain = rms(&out.signal().x[600..2400]) / rms(&in_band.x[600..2400]);
        assert!(gain > 0.8 && gain < 1.1, "pass-band gain {gain}");

        let high = signal_from(30.0, |t| (2.0 * PI * 10.0 * t).sin(), 3000);
        let out = filter.apply(&high).unwrap();
        let gain = rms(&out.signal().x[600..2400]) / rms(&high.x[600..2400]);
        assert!(gain < 0.01, "stop-band gain {gain}");
    }

    #[test]
    fn test_deterministic() {
        let filter = BandpassFilter::new(FilterConfig::default());
        let signal = signal_from(30.0, |t| (t * 3.0).sin() + 0.3 * (t * 11.0).cos(), 900);
        assert_eq!(filter.apply(&signal).unwrap(), filter.apply(&signal).unwrap());
    }

    #[test]
    fn test_rejects_bad_band() {
        let signal = signal_from(30.0, |_| 0.0, 100);

        let filter = BandpassFilter::new(FilterConfig {
            low_cutoff_hz: 2.0,
            high_cutoff_hz: 1.0,
            order: 4,
        });
        assert!(matches!(
            filter.apply(&signal),
            Err(ActigraphyError::InvalidCutoff { .. })
        ));

        let filter = BandpassFilter::new(FilterConfig {
            low_cutoff_hz: 0.29,
            high_cutoff_hz: 16.0,
            order: 4,
        });
        assert!(filter.apply(&signal).is_err());
    }

    #[test]
    fn test_rejects_empty() {
        let filter = BandpassFilter::new(FilterConfig::default());
        let signal = signal_from(30.0, |_| 0.0, 0);
        assert_eq!(
            filter.apply(&signal),
            Err(ActigraphyError::EmptySignal {
                stage: "bandpass filter"
            })
        );
    }

    #[test]
    fn test_lowpass_attenuates_above_cutoff() {
        let signal = signal_from(100.0, |t| 1.0 + (2.0 * PI * 40.0 * t).sin(), 2000);
        let out = lowpass(&signal, 14.9, 4).unwrap();
        assert_eq!(out.len(), signal.len());
        let ripple: Vec<f64> = out.x[200..1800].iter().map(|v| v - 1.0).collect();
        assert!(rms(&ripple) < 0.01);
    }

    #[test]
    fn test_butterworth_sections() {
        let sections = butterworth(EdgeKind::LowPass, 4, 1.63, 30.0);
        assert_eq!(sections.len(), 2);
        for section in &sections {
            assert!((section.dc_gain() - 1.0).abs() < 1e-9);
        }

        let sections = butterworth(EdgeKind::HighPass, 3, 0.29, 30.0);
        assert_eq!(sections.len(), 2);
        for section in &sections {
            assert!(section.dc_gain().abs() < 1e-12);
        }
    }
}
