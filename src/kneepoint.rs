//! Knee-point detection on a filtered acceleration trace.
//!
//! The trace is low-passed, differentiated twice and the candidate set is
//! restricted to samples whose first derivative has the requested sign. The
//! knee is the masked argmax of `|d²a/dt²|` (curvature) or `|da/dt|` (slope).
//! [`locate_knee`] does the same on a trace that is already filtered,
//! restricted to an index range.

use crate::error::{KneepointError, SignalError};
use crate::filter::{gradient_uniform, lowpass_zero_phase};
use crate::types::mean_sample_period;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Sign of the first derivative a knee must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KneeDirection {
    Positive,
    Negative,
}

impl KneeDirection {
    fn admits(self, slope: f64) -> bool {
        match self {
            KneeDirection::Positive => slope > 0.0,
            KneeDirection::Negative => slope < 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KneeMethod {
    Curvature,
    Slope,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Kneepoint {
    pub index: usize,
    pub time: f64,
    /// Filtered signal value at the knee
    pub value: f64,
}

/// Locate the knee of `accel` sampled on `time`.
pub fn detect_kneepoint(
    time: &[f64],
    accel: &[f64],
    direction: KneeDirection,
    cutoff_hz: f64,
    method: KneeMethod,
) -> Result<Kneepoint, KneepointError> {
    let filtered = lowpass_zero_phase(time, accel, cutoff_hz)?;
    locate_knee(time, &filtered, 0..=filtered.len().saturating_sub(1), direction, method)
}

/// Locate the knee of an already filtered trace, searching only `range`.
///
/// Derivatives are taken over the whole trace, so samples at the edges of
/// `range` see their real neighbours.
pub fn locate_knee(
    time: &[f64],
    filtered: &[f64],
    range: RangeInclusive<usize>,
    direction: KneeDirection,
    method: KneeMethod,
) -> Result<Kneepoint, KneepointError> {
    let dt = mean_sample_period(time)
        .ok_or_else(|| SignalError::InvalidSignal("knee point needs two samples".into()))?;
    if filtered.len() != time.len() || *range.end() >= filtered.len() {
        return Err(SignalError::InvalidSignal(format!(
            "knee search range {range:?} outside {} samples",
            filtered.len().min(time.len())
        ))
        .into());
    }

    let d1 = gradient_uniform(filtered, dt);
    let d2 = gradient_uniform(&d1, dt);
    let score = match method {
        KneeMethod::Curvature => &d2,
        KneeMethod::Slope => &d1,
    };

    // masked samples never compete; ties keep the earliest index
    let mut best: Option<(usize, f64)> = None;
    for i in range {
        let (slope, s) = (d1[i], score[i]);
        if !direction.admits(slope) || s.is_nan() {
            continue;
        }
        let candidate = s.abs();
        if best.map_or(true, |(_, b)| candidate > b) {
            best = Some((i, candidate));
        }
    }

    let (index, _) = best.ok_or(KneepointError::NoKneepointFound)?;
    Ok(Kneepoint {
        index,
        time: time[index],
        value: filtered[index],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.01;

    /// Flat until `knee`, then a ramp down at `rate` per second.
    fn kinked(n: usize, knee: usize, rate: f64) -> (Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..n).map(|i| i as f64 * DT).collect();
        let accel = (0..n)
            .map(|i| if i <= knee { 0.0 } else { -rate * (i - knee) as f64 * DT })
            .collect();
        (time, accel)
    }

    #[test]
    fn negative_knee_found_at_kink() {
        let (time, accel) = kinked(300, 150, 10.0);
        let knee = detect_kneepoint(&time, &accel, KneeDirection::Negative, 10.0, KneeMethod::Curvature)
            .unwrap();
        assert!(knee.index.abs_diff(150) <= 1, "knee at {}", knee.index);
        assert!((knee.time - 1.5).abs() < 0.011);
    }

    #[test]
    fn positive_direction_misses_negative_knee() {
        let (time, accel) = kinked(300, 150, 10.0);
        let negative =
            detect_kneepoint(&time, &accel, KneeDirection::Negative, 10.0, KneeMethod::Curvature)
                .unwrap();
        match detect_kneepoint(&time, &accel, KneeDirection::Positive, 10.0, KneeMethod::Curvature) {
            Ok(knee) => assert_ne!(knee.index, negative.index),
            Err(err) => assert_eq!(err, KneepointError::NoKneepointFound),
        }
    }

    #[test]
    fn slope_method_picks_steepest_sample() {
        let (time, accel) = kinked(300, 150, 10.0);
        let knee = detect_kneepoint(&time, &accel, KneeDirection::Negative, 10.0, KneeMethod::Slope)
            .unwrap();
        assert!(knee.index > 150);
    }

    #[test]
    fn flat_trace_has_no_knee() {
        let time: Vec<f64> = (0..100).map(|i| i as f64 * DT).collect();
        let accel = vec![0.0; 100];
        assert_eq!(
            detect_kneepoint(&time, &accel, KneeDirection::Negative, 10.0, KneeMethod::Curvature),
            Err(KneepointError::NoKneepointFound)
        );
    }

    #[test]
    fn single_sample_is_invalid() {
        let err = detect_kneepoint(&[0.0], &[1.0], KneeDirection::Negative, 10.0, KneeMethod::Slope)
            .unwrap_err();
        assert!(matches!(err, KneepointError::Signal(SignalError::InvalidSignal(_))));
    }

    #[test]
    fn search_range_limits_candidates() {
        let (time, accel) = kinked(300, 150, 10.0);
        let filtered = lowpass_zero_phase(&time, &accel, 10.0).unwrap();
        let knee = locate_knee(&time, &filtered, 140..=170, KneeDirection::Negative, KneeMethod::Curvature)
            .unwrap();
        assert!(knee.index.abs_diff(150) <= 1, "knee at {}", knee.index);

        // past the kink only the straight ramp is searched
        let ramp = locate_knee(&time, &filtered, 180..=220, KneeDirection::Negative, KneeMethod::Slope)
            .unwrap();
        assert!((180..=220).contains(&ramp.index));
    }

    #[test]
    fn range_outside_trace_is_invalid() {
        let (time, accel) = kinked(50, 20, 10.0);
        let err = locate_knee(&time, &accel, 10..=50, KneeDirection::Negative, KneeMethod::Slope)
            .unwrap_err();
        assert!(matches!(err, KneepointError::Signal(SignalError::InvalidSignal(_))));
    }
}
