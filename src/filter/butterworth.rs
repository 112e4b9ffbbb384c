//! Butterworth low-pass realised as cascaded second-order sections.
//!
//! Each section is the bilinear transform (with frequency prewarping) of one
//! conjugate pole pair of the analog prototype, so an order-`2k` design is `k`
//! biquads. Zero-phase filtering runs the cascade forward and backward over an
//! odd-reflected extension of the input, starting every section from its
//! steady-state response to the first sample.

use std::f64::consts::PI;

/// Direct-form II transposed biquad with `a0` normalised to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

impl Biquad {
    /// Low-pass section for prewarped cutoff `k = tan(pi * fc / fs)` and quality `q`.
    fn lowpass(k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        let b0 = k2 * norm;
        Self {
            b: [b0, 2.0 * b0, b0],
            a: [2.0 * (k2 - 1.0) * norm, (1.0 - k / q + k2) * norm],
        }
    }

    /// DC gain of the section.
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// State reached after an infinitely long unit step.
    fn steady_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        let z2 = self.b[2] - self.a[1] * g;
        let z1 = self.b[1] - self.a[0] * g + z2;
        [z1, z2]
    }

    /// Filter `x` in place, starting from the steady state scaled by `x[0]`.
    fn run(&self, x: &mut [f64]) {
        let Some(&x0) = x.first() else {
            return;
        };
        let [zi1, zi2] = self.steady_state();
        let (mut z1, mut z2) = (zi1 * x0, zi2 * x0);
        for sample in x.iter_mut() {
            let input = *sample;
            let y = self.b[0] * input + z1;
            z1 = self.b[1] * input - self.a[0] * y + z2;
            z2 = self.b[2] * input - self.a[1] * y;
            *sample = y;
        }
    }
}

/// Even-order Butterworth low-pass filter.
#[derive(Clone, Debug, PartialEq)]
pub struct ButterworthLowPass {
    sections: Vec<Biquad>,
}

impl ButterworthLowPass {
    /// Design an order-`order` filter; odd orders are rounded up to the next
    /// even order. `cutoff_hz` must lie strictly inside `(0, sample_rate_hz / 2)`.
    pub fn design(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        let order = order.max(2);
        let pairs = order.div_ceil(2);
        let n = (2 * pairs) as f64;
        let k = (PI * cutoff_hz / sample_rate_hz).tan();
        let sections = (1..=pairs)
            .map(|i| {
                let theta = PI * (2 * i - 1) as f64 / (2.0 * n);
                let q = 1.0 / (2.0 * theta.cos());
                Biquad::lowpass(k, q)
            })
            .collect();
        Self { sections }
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Number of samples reflected at each edge during zero-phase filtering.
    pub fn pad_len(&self) -> usize {
        3 * (2 * self.sections.len() + 1)
    }

    /// Causal (single-pass) filtering.
    pub fn filter(&self, x: &[f64]) -> Vec<f64> {
        let mut out = x.to_vec();
        for section in &self.sections {
            section.run(&mut out);
        }
        out
    }

    /// Forward-backward filtering. Returns `None` when `x` is too short for
    /// the edge padding.
    pub fn filtfilt(&self, x: &[f64]) -> Option<Vec<f64>> {
        let pad = self.pad_len();
        if x.len() <= pad {
            return None;
        }
        let mut ext = odd_extend(x, pad);
        for section in &self.sections {
            section.run(&mut ext);
        }
        ext.reverse();
        for section in &self.sections {
            section.run(&mut ext);
        }
        ext.reverse();
        Some(ext[pad..pad + x.len()].to_vec())
    }
}

/// Odd reflection of `x` about both end points, `pad` samples on each side.
fn odd_extend(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let first = x[0];
    let last = x[n - 1];
    let mut ext = Vec::with_capacity(n + 2 * pad);
    ext.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));
    ext
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sections_have_unit_dc_gain() {
        let filter = ButterworthLowPass::design(4, 10.0, 100.0);
        assert_eq!(filter.sections().len(), 2);
        for section in filter.sections() {
            assert_abs_diff_eq!(section.dc_gain(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_input_passes_unchanged() {
        let filter = ButterworthLowPass::design(4, 5.0, 100.0);
        let x = vec![3.5; 64];
        let y = filter.filtfilt(&x).expect("long enough");
        for v in y {
            assert_abs_diff_eq!(v, 3.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn odd_extension_mirrors_about_edges() {
        let ext = odd_extend(&[1.0, 2.0, 4.0, 7.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn short_input_is_rejected() {
        let filter = ButterworthLowPass::design(4, 5.0, 100.0);
        assert!(filter.filtfilt(&[0.0; 15]).is_none());
        assert!(filter.filtfilt(&[0.0; 16]).is_some());
    }

    #[test]
    fn high_frequency_is_attenuated() {
        let fs = 100.0;
        let filter = ButterworthLowPass::design(4, 2.0, fs);
        let x: Vec<f64> = (0..400)
            .map(|i| (2.0 * PI * 30.0 * i as f64 / fs).sin())
            .collect();
        let y = filter.filtfilt(&x).unwrap();
        let peak = y[50..350].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak < 0.01, "30 Hz tone should be suppressed, peak={peak}");
    }
}
