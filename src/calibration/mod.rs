//! Speed-dependent calibration curves and their clamped interpolation.
//!
//! A curve is a pair of equally long sequences `(breakpoints, values)` with
//! strictly increasing breakpoints. Lookups clamp the query into the
//! breakpoint range and interpolate linearly; there is no extrapolation.

mod loader;

pub use loader::{load_calibration, parse_calibration};

use crate::error::CalibrationError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Threshold as a function of vehicle speed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCurve")]
pub struct CalibrationCurve {
    breakpoints: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawCurve {
    breakpoints: Vec<f64>,
    values: Vec<f64>,
}

impl TryFrom<RawCurve> for CalibrationCurve {
    type Error = CalibrationError;

    fn try_from(raw: RawCurve) -> Result<Self, Self::Error> {
        CalibrationCurve::new("<inline>", raw.breakpoints, raw.values)
    }
}

impl CalibrationCurve {
    /// Validate and build a curve. `name` only feeds error messages.
    pub fn new(name: &str, breakpoints: Vec<f64>, values: Vec<f64>) -> Result<Self, CalibrationError> {
        if breakpoints.is_empty() || breakpoints.len() != values.len() {
            return Err(CalibrationError::ShapeMismatch {
                name: name.to_string(),
                breakpoints: breakpoints.len(),
                values: values.len(),
            });
        }
        if let Some(index) = breakpoints.iter().position(|b| !b.is_finite()) {
            return Err(CalibrationError::UnsortedBreakpoints {
                name: name.to_string(),
                index,
            });
        }
        if let Some(pos) = breakpoints.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CalibrationError::UnsortedBreakpoints {
                name: name.to_string(),
                index: pos + 1,
            });
        }
        Ok(Self { breakpoints, values })
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Clamped linear interpolation at `speed`.
    ///
    /// A single-point curve is constant. A NaN query yields NaN.
    pub fn interpolate(&self, speed: f64) -> f64 {
        let n = self.breakpoints.len();
        if speed.is_nan() {
            return f64::NAN;
        }
        if n == 1 || speed <= self.breakpoints[0] {
            return self.values[0];
        }
        if speed >= self.breakpoints[n - 1] {
            return self.values[n - 1];
        }
        // first breakpoint strictly greater than speed, in 1..n
        let hi = self.breakpoints.partition_point(|&b| b <= speed);
        let lo = hi - 1;
        let (x0, x1) = (self.breakpoints[lo], self.breakpoints[hi]);
        let (y0, y1) = (self.values[lo], self.values[hi]);
        y0 + (y1 - y0) * (speed - x0) / (x1 - x0)
    }

    /// Multiply every value by `factor` when all values lie in `[0, 1]`.
    ///
    /// Returns whether the curve was rescaled.
    pub fn scale_unit_interval(&mut self, factor: f64) -> bool {
        if self.values.iter().all(|v| (0.0..=1.0).contains(v)) {
            self.values.iter_mut().for_each(|v| *v *= factor);
            true
        } else {
            false
        }
    }
}

/// Named calibration curves loaded once at startup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalibrationSet {
    curves: BTreeMap<String, CalibrationCurve>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, curve: CalibrationCurve) {
        self.curves.insert(name.into(), curve);
    }

    pub fn with_curve(mut self, name: impl Into<String>, curve: CalibrationCurve) -> Self {
        self.insert(name, curve);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CalibrationCurve> {
        self.curves.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Interpolated threshold of curve `name` at `speed`, `None` if absent.
    pub fn threshold(&self, name: &str, speed: f64) -> Option<f64> {
        self.get(name).map(|curve| curve.interpolate(speed))
    }

    /// Rescale fractional curves (values in `[0, 1]`) to percent.
    pub fn scale_percent_curves<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            if let Some(curve) = self.curves.get_mut(name.as_ref()) {
                if curve.scale_unit_interval(100.0) {
                    debug!("calibration: scaled '{}' x100", name.as_ref());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve() -> CalibrationCurve {
        CalibrationCurve::new("test", vec![10.0, 50.0, 100.0], vec![8.0, 4.0, 2.0]).unwrap()
    }

    #[test]
    fn clamps_below_and_above_range() {
        let c = curve();
        for speed in [-5.0, 0.0, 9.99, 10.0] {
            assert_eq!(c.interpolate(speed), 8.0);
        }
        for speed in [100.0, 100.01, 250.0, f64::INFINITY] {
            assert_eq!(c.interpolate(speed), 2.0);
        }
    }

    #[test]
    fn interpolates_linearly_inside_range() {
        let c = curve();
        assert_relative_eq!(c.interpolate(30.0), 6.0);
        assert_relative_eq!(c.interpolate(50.0), 4.0);
        assert_relative_eq!(c.interpolate(75.0), 3.0);
        for speed in [12.5, 33.3, 61.0, 99.0] {
            let (lo, hi) = if speed < 50.0 { (0, 1) } else { (1, 2) };
            let (x0, x1) = (c.breakpoints()[lo], c.breakpoints()[hi]);
            let (y0, y1) = (c.values()[lo], c.values()[hi]);
            let expected = y0 + (y1 - y0) * (speed - x0) / (x1 - x0);
            assert_relative_eq!(c.interpolate(speed), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_breakpoint_is_constant() {
        let c = CalibrationCurve::new("one", vec![40.0], vec![3.0]).unwrap();
        for speed in [-1.0, 40.0, 1e6] {
            assert_eq!(c.interpolate(speed), 3.0);
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            CalibrationCurve::new("a", vec![], vec![]),
            Err(CalibrationError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            CalibrationCurve::new("a", vec![1.0, 2.0], vec![1.0]),
            Err(CalibrationError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            CalibrationCurve::new("a", vec![1.0, 1.0], vec![1.0, 2.0]),
            Err(CalibrationError::UnsortedBreakpoints { index: 1, .. })
        ));
    }

    #[test]
    fn percent_scaling_only_touches_fractional_curves() {
        let mut set = CalibrationSet::new()
            .with_curve("frac", CalibrationCurve::new("frac", vec![0.0, 1.0], vec![0.25, 0.5]).unwrap())
            .with_curve("pct", curve());
        set.scale_percent_curves(&["frac", "pct", "absent"]);
        assert_eq!(set.get("frac").unwrap().values(), &[25.0, 50.0]);
        assert_eq!(set.get("pct").unwrap().values(), &[8.0, 4.0, 2.0]);
    }
}
