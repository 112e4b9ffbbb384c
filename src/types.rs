//! Core data model: multi-channel signals and event windows cut from them.

use crate::error::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Logical channels consumed by the pipeline.
///
/// Source recordings name their columns differently from one test campaign to
/// the next; `config::ChannelMap` resolves each logical channel to a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// AEB deceleration request (m/s², idle value is a large positive number)
    #[serde(rename = "aebTargetDecel")]
    TargetDecel,
    /// Ego vehicle speed (m/s)
    #[serde(rename = "egoSpeed")]
    EgoSpeed,
    /// Measured longitudinal acceleration (m/s²)
    #[serde(rename = "longActAccel")]
    LongAccel,
    /// Measured lateral acceleration (m/s²)
    #[serde(rename = "latActAccel")]
    LatAccel,
    /// Accelerator pedal position (%)
    #[serde(rename = "throttleValue")]
    Throttle,
    /// Yaw rate (rad/s)
    #[serde(rename = "yawRate")]
    YawRate,
    /// Steering wheel angle (rad)
    #[serde(rename = "steerWheelAngle")]
    SteerAngle,
    /// Steering wheel angle rate (rad/s)
    #[serde(rename = "steerWheelAngleSpeed")]
    SteerRate,
    /// Longitudinal gap to the target object (m), 0 when nothing is tracked
    #[serde(rename = "longGap")]
    LongGap,
}

impl Channel {
    pub const ALL: [Channel; 9] = [
        Channel::TargetDecel,
        Channel::EgoSpeed,
        Channel::LongAccel,
        Channel::LatAccel,
        Channel::Throttle,
        Channel::YawRate,
        Channel::SteerAngle,
        Channel::SteerRate,
        Channel::LongGap,
    ];

    /// Canonical column name of the channel.
    pub fn name(self) -> &'static str {
        match self {
            Channel::TargetDecel => "aebTargetDecel",
            Channel::EgoSpeed => "egoSpeed",
            Channel::LongAccel => "longActAccel",
            Channel::LatAccel => "latActAccel",
            Channel::Throttle => "throttleValue",
            Channel::YawRate => "yawRate",
            Channel::SteerAngle => "steerWheelAngle",
            Channel::SteerRate => "steerWheelAngleSpeed",
            Channel::LongGap => "longGap",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channels sampled on a common, monotonically non-decreasing time base.
///
/// The length invariant is checked once in [`Signal::new`]; every index
/// computed against `time()` is therefore valid for every channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    time: Vec<f64>,
    channels: BTreeMap<Channel, Vec<f64>>,
}

impl Signal {
    /// Build a signal, rejecting channels whose length differs from `time`.
    pub fn new(time: Vec<f64>, channels: BTreeMap<Channel, Vec<f64>>) -> SignalResult<Self> {
        for (&channel, samples) in &channels {
            if samples.len() != time.len() {
                return Err(SignalError::ChannelLengthMismatch {
                    channel,
                    expected: time.len(),
                    actual: samples.len(),
                });
            }
        }
        if let Some(pos) = time.windows(2).position(|w| w[1] < w[0]) {
            return Err(SignalError::NonMonotonicTime(pos + 1));
        }
        Ok(Self { time, channels })
    }

    /// Convenience constructor from `(channel, samples)` pairs.
    pub fn from_channels<I>(time: Vec<f64>, channels: I) -> SignalResult<Self>
    where
        I: IntoIterator<Item = (Channel, Vec<f64>)>,
    {
        Self::new(time, channels.into_iter().collect())
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn has(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    pub fn channel(&self, channel: Channel) -> Option<&[f64]> {
        self.channels.get(&channel).map(Vec::as_slice)
    }

    /// Channel samples or `MissingChannel`.
    pub fn require(&self, channel: Channel) -> SignalResult<&[f64]> {
        self.channel(channel)
            .ok_or(SignalError::MissingChannel(channel))
    }

    pub fn channels(&self) -> impl Iterator<Item = (Channel, &[f64])> {
        self.channels.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Mean spacing of the time base, `None` for fewer than two samples.
    pub fn mean_sample_period(&self) -> Option<f64> {
        mean_sample_period(&self.time)
    }

    /// Index of the sample closest to `t`.
    pub fn index_at_time(&self, t: f64) -> Option<usize> {
        nearest_index(&self.time, t)
    }

    /// Independent copy of the samples covered by `window` (inclusive bounds).
    pub fn slice(&self, window: &EventWindow) -> Signal {
        let stop = window.stop.min(self.len().saturating_sub(1));
        let start = window.start.min(stop);
        let range = start..stop + 1;
        Signal {
            time: self.time[range.clone()].to_vec(),
            channels: self
                .channels
                .iter()
                .map(|(c, v)| (*c, v[range.clone()].to_vec()))
                .collect(),
        }
    }

    /// Replace (or add) a channel; length must match the time base.
    pub fn with_channel(mut self, channel: Channel, samples: Vec<f64>) -> SignalResult<Self> {
        if samples.len() != self.time.len() {
            return Err(SignalError::ChannelLengthMismatch {
                channel,
                expected: self.time.len(),
                actual: samples.len(),
            });
        }
        self.channels.insert(channel, samples);
        Ok(self)
    }
}

/// Mean of consecutive differences of `time`.
pub fn mean_sample_period(time: &[f64]) -> Option<f64> {
    if time.len() < 2 {
        return None;
    }
    let span = time[time.len() - 1] - time[0];
    Some(span / (time.len() - 1) as f64)
}

/// Index of the sample whose time is closest to `target`.
///
/// `time` must be sorted. Ties resolve to the earliest sample, including runs
/// of duplicated timestamps. Returns `None` for an empty time base.
pub fn nearest_index(time: &[f64], target: f64) -> Option<usize> {
    if time.is_empty() {
        return None;
    }
    let upper = time.partition_point(|&t| t < target);
    let mut best = if upper == 0 {
        0
    } else if upper == time.len() {
        time.len() - 1
    } else if target - time[upper - 1] <= time[upper] - target {
        upper - 1
    } else {
        upper
    };
    while best > 0 && time[best - 1] == time[best] {
        best -= 1;
    }
    Some(best)
}

/// One braking intervention plus pre-roll and post-roll padding.
///
/// `start` and `stop` are inclusive sample indices into the source signal;
/// `start < stop < signal.len()` holds for every emitted window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWindow {
    /// 1-based position of the trigger among the recording's start candidates
    pub ordinal: usize,
    pub start: usize,
    pub stop: usize,
    pub start_time: f64,
    pub stop_time: f64,
    /// Time of the start candidate that opened the window
    pub trigger_time: f64,
    /// Index of the end candidate that closed the window, if one matched
    pub end_candidate: Option<usize>,
    /// End-candidate pointer after this window was cut
    pub end_cursor: usize,
}

impl EventWindow {
    /// Number of samples covered by the window.
    pub fn sample_count(&self) -> usize {
        self.stop - self.start + 1
    }

    pub fn duration(&self) -> f64 {
        self.stop_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, dt: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * dt).collect()
    }

    #[test]
    fn mismatched_channel_is_rejected() {
        let err = Signal::from_channels(ramp(5, 0.1), [(Channel::EgoSpeed, vec![0.0; 4])])
            .unwrap_err();
        assert_eq!(
            err,
            SignalError::ChannelLengthMismatch {
                channel: Channel::EgoSpeed,
                expected: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn decreasing_time_is_rejected() {
        let err = Signal::from_channels(vec![0.0, 0.1, 0.05], []).unwrap_err();
        assert_eq!(err, SignalError::NonMonotonicTime(2));
    }

    #[test]
    fn nearest_index_prefers_first_on_ties() {
        let time = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(nearest_index(&time, 1.5), Some(1));
        assert_eq!(nearest_index(&time, 1.6), Some(2));
        assert_eq!(nearest_index(&time, -4.0), Some(0));
        assert_eq!(nearest_index(&time, 40.0), Some(3));

        let dup = [0.0, 1.0, 1.0, 1.0, 2.0];
        assert_eq!(nearest_index(&dup, 1.2), Some(1));
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn slice_copies_inclusive_range() {
        let signal =
            Signal::from_channels(ramp(10, 1.0), [(Channel::Throttle, ramp(10, 2.0))]).unwrap();
        let window = EventWindow {
            ordinal: 1,
            start: 2,
            stop: 5,
            start_time: 2.0,
            stop_time: 5.0,
            trigger_time: 3.0,
            end_candidate: None,
            end_cursor: 0,
        };
        let chunk = signal.slice(&window);
        assert_eq!(chunk.time(), &[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(chunk.channel(Channel::Throttle).unwrap(), &[4.0, 6.0, 8.0, 10.0]);
        assert_eq!(window.sample_count(), chunk.len());
    }
}
