//! Signal conditioning shared by the locator, knee-point detector and KPIs.
//!
//! - [`lowpass_zero_phase`]: 4th-order Butterworth low-pass applied forward and
//!   backward, sample rate derived from the mean spacing of the time base.
//! - [`gradient`] / [`gradient_uniform`]: second-order accurate numerical
//!   derivatives (central differences inside, one-sided at the edges).

mod butterworth;
mod gradient;

pub use butterworth::{Biquad, ButterworthLowPass};
pub use gradient::{gradient, gradient_uniform};

use crate::error::{SignalError, SignalResult};
use crate::types::mean_sample_period;
use log::debug;

/// Filter order used for acceleration channels.
pub const DEFAULT_ORDER: usize = 4;

/// Zero-phase low-pass of `signal` sampled on `time`.
///
/// Non-finite samples are treated as zero and a cutoff at or above Nyquist is
/// clamped to 99% of Nyquist. Inputs too short for the edge padding come back
/// unfiltered.
pub fn lowpass_zero_phase(time: &[f64], signal: &[f64], cutoff_hz: f64) -> SignalResult<Vec<f64>> {
    if time.len() != signal.len() {
        return Err(SignalError::InvalidSignal(format!(
            "time base has {} samples, signal has {}",
            time.len(),
            signal.len()
        )));
    }
    let dt = mean_sample_period(time).ok_or_else(|| {
        SignalError::InvalidSignal(format!("need at least 2 samples, got {}", time.len()))
    })?;
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SignalError::InvalidSignal(format!(
            "mean sample spacing must be positive, got {dt}"
        )));
    }
    if !(cutoff_hz.is_finite() && cutoff_hz > 0.0) {
        return Err(SignalError::InvalidSignal(format!(
            "cutoff must be positive, got {cutoff_hz}"
        )));
    }

    let fs = 1.0 / dt;
    let nyquist = 0.5 * fs;
    let cutoff = if cutoff_hz >= nyquist {
        0.99 * nyquist
    } else {
        cutoff_hz
    };

    let clean: Vec<f64> = signal
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect();

    let filter = ButterworthLowPass::design(DEFAULT_ORDER, cutoff, fs);
    match filter.filtfilt(&clean) {
        Some(filtered) => Ok(filtered),
        None => {
            debug!(
                "lowpass_zero_phase: {} samples too short for padding {}, returning input",
                clean.len(),
                filter.pad_len()
            );
            Ok(clean)
        }
    }
}
