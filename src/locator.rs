//! Intervention markers inside one event window.
//!
//! - M0 ([`InterventionLocator::locate_start`]): first sample whose
//!   deceleration request reaches the partial-braking level.
//! - M2 ([`InterventionLocator::locate_end`]): earliest of actuation release
//!   and vehicle standstill after M0, falling back to the window end.

use crate::error::SignalResult;
use crate::types::{Channel, Signal};
use serde::{Deserialize, Serialize};

/// Start of the intervention (M0).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InterventionStart {
    pub index: usize,
    pub time: f64,
}

/// Which condition closed the intervention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCause {
    /// Deceleration request released above the end threshold
    Actuation,
    /// Ego speed reached exactly zero first
    VehicleStop,
    /// Neither condition held inside the window
    WindowEnd,
}

/// End of the intervention (M2).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionEnd {
    pub index: usize,
    pub time: f64,
    pub vehicle_stopped: bool,
    pub cause: EndCause,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterventionLocator {
    /// Request level marking the intervention start (m/s²)
    pub start_threshold: f64,
    pub start_tolerance: f64,
    /// Request level above which the actuation counts as released (m/s²)
    pub end_threshold: f64,
}

impl Default for InterventionLocator {
    fn default() -> Self {
        Self {
            start_threshold: -6.0,
            start_tolerance: 0.1,
            end_threshold: -4.9,
        }
    }
}

impl InterventionLocator {
    /// First index whose request is below `start_threshold + start_tolerance`.
    ///
    /// `Ok(None)` means the window holds no intervention; the event is dropped
    /// by the caller.
    pub fn locate_start(&self, signal: &Signal) -> SignalResult<Option<InterventionStart>> {
        let decel = signal.require(Channel::TargetDecel)?;
        let limit = self.start_threshold + self.start_tolerance;
        Ok(decel
            .iter()
            .position(|&d| d < limit)
            .map(|index| InterventionStart {
                index,
                time: signal.time()[index],
            }))
    }

    /// Resolve M2 from `start` onwards.
    ///
    /// | release | standstill | chosen                 |
    /// |---------|------------|------------------------|
    /// | yes     | yes        | earlier of the two     |
    /// | yes     | no         | release                |
    /// | no      | yes        | standstill             |
    /// | no      | no         | last sample            |
    ///
    /// Standstill is only searched up to the release index when a release
    /// exists.
    pub fn locate_end(&self, signal: &Signal, start: usize) -> SignalResult<InterventionEnd> {
        let decel = signal.require(Channel::TargetDecel)?;
        let speed = signal.require(Channel::EgoSpeed)?;
        let last = signal.len().saturating_sub(1);
        let start = start.min(last);

        let release = decel[start..]
            .iter()
            .position(|&d| d > self.end_threshold)
            .map(|offset| start + offset);
        let search_end = release.unwrap_or(last);
        let standstill = speed[start..=search_end]
            .iter()
            .position(|&v| v == 0.0)
            .map(|offset| start + offset);

        let (index, cause) = match (release, standstill) {
            (Some(r), Some(s)) if s < r => (s, EndCause::VehicleStop),
            (Some(r), Some(_)) => (r, EndCause::Actuation),
            (Some(r), None) => (r, EndCause::Actuation),
            (None, Some(s)) => (s, EndCause::VehicleStop),
            (None, None) => (last, EndCause::WindowEnd),
        };

        Ok(InterventionEnd {
            index,
            time: signal.time().get(index).copied().unwrap_or(f64::NAN),
            vehicle_stopped: standstill.is_some(),
            cause,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignalError;

    /// 10 samples at 10 Hz; request -6 from sample 2, optional release and stop.
    fn window(release_at: Option<usize>, stop_at: Option<usize>) -> Signal {
        let n = 10;
        let time: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        let decel: Vec<f64> = (0..n)
            .map(|i| match release_at {
                Some(r) if i >= r => 30.0,
                _ if i >= 2 => -6.0,
                _ => 30.0,
            })
            .collect();
        let speed: Vec<f64> = (0..n)
            .map(|i| match stop_at {
                Some(s) if i >= s => 0.0,
                _ => 10.0 - i as f64 * 0.5,
            })
            .collect();
        Signal::from_channels(time, [(Channel::TargetDecel, decel), (Channel::EgoSpeed, speed)])
            .unwrap()
    }

    #[test]
    fn start_is_first_sample_at_partial_level() {
        let locator = InterventionLocator::default();
        let start = locator.locate_start(&window(None, None)).unwrap().unwrap();
        assert_eq!(start.index, 2);
        assert!((start.time - 0.2).abs() < 1e-12);
    }

    #[test]
    fn start_not_found_without_braking() {
        let time = vec![0.0, 0.1, 0.2];
        let signal = Signal::from_channels(time, [(Channel::TargetDecel, vec![30.0, -5.8, 30.0])])
            .unwrap();
        assert_eq!(InterventionLocator::default().locate_start(&signal).unwrap(), None);
    }

    #[test]
    fn release_and_stop_take_the_earlier() {
        let locator = InterventionLocator::default();
        let end = locator.locate_end(&window(Some(7), Some(5)), 2).unwrap();
        assert_eq!(end.index, 5);
        assert!(end.vehicle_stopped);
        assert_eq!(end.cause, EndCause::VehicleStop);
    }

    #[test]
    fn release_only() {
        let end = InterventionLocator::default()
            .locate_end(&window(Some(7), None), 2)
            .unwrap();
        assert_eq!(end.index, 7);
        assert!(!end.vehicle_stopped);
        assert_eq!(end.cause, EndCause::Actuation);
    }

    #[test]
    fn stop_only() {
        let end = InterventionLocator::default()
            .locate_end(&window(None, Some(6)), 2)
            .unwrap();
        assert_eq!(end.index, 6);
        assert!(end.vehicle_stopped);
        assert_eq!(end.cause, EndCause::VehicleStop);
    }

    #[test]
    fn neither_falls_back_to_last_sample() {
        let end = InterventionLocator::default()
            .locate_end(&window(None, None), 2)
            .unwrap();
        assert_eq!(end.index, 9);
        assert!(!end.vehicle_stopped);
        assert_eq!(end.cause, EndCause::WindowEnd);
    }

    #[test]
    fn stop_after_release_is_ignored() {
        let end = InterventionLocator::default()
            .locate_end(&window(Some(4), Some(8)), 2)
            .unwrap();
        assert_eq!(end.index, 4);
        assert!(!end.vehicle_stopped);
    }

    #[test]
    fn missing_speed_is_reported() {
        let signal = Signal::from_channels(vec![0.0, 0.1], [(Channel::TargetDecel, vec![-6.0, -6.0])])
            .unwrap();
        assert_eq!(
            InterventionLocator::default().locate_end(&signal, 0),
            Err(SignalError::MissingChannel(Channel::EgoSpeed))
        );
    }
}
