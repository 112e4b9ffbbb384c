use super::options::KpiParams;
use super::thresholds::Thresholds;
use crate::error::{KpiError, KpiResult, SignalError};
use crate::filter::lowpass_zero_phase;
use crate::locator::{InterventionEnd, InterventionStart};
use crate::types::{Channel, Signal};
use log::warn;
use std::collections::BTreeMap;

/// Channels low-passed once per event before any KPI runs.
const PREFILTERED: [Channel; 2] = [Channel::LongAccel, Channel::LatAccel];

/// Read-only inputs shared by every KPI group of one event.
pub struct EventContext<'a> {
    pub label: &'a str,
    pub signal: &'a Signal,
    pub start: InterventionStart,
    pub end: InterventionEnd,
    pub params: &'a KpiParams,
    pub thresholds: Thresholds,
    filtered: BTreeMap<Channel, Vec<f64>>,
}

impl<'a> EventContext<'a> {
    pub fn new(
        label: &'a str,
        signal: &'a Signal,
        start: InterventionStart,
        end: InterventionEnd,
        params: &'a KpiParams,
        thresholds: Thresholds,
    ) -> Self {
        let mut filtered = BTreeMap::new();
        for channel in PREFILTERED {
            let Some(raw) = signal.channel(channel) else {
                continue;
            };
            match lowpass_zero_phase(signal.time(), raw, params.cutoff_hz) {
                Ok(samples) => {
                    filtered.insert(channel, samples);
                }
                Err(err) => warn!("{label}: cannot filter {channel}: {err}"),
            }
        }
        Self {
            label,
            signal,
            start,
            end,
            params,
            thresholds,
            filtered,
        }
    }

    pub fn time(&self) -> &[f64] {
        self.signal.time()
    }

    pub fn raw(&self, channel: Channel) -> KpiResult<&[f64]> {
        Ok(self.signal.require(channel)?)
    }

    /// Prefiltered samples of an acceleration channel.
    pub fn filtered(&self, channel: Channel) -> KpiResult<&[f64]> {
        self.filtered
            .get(&channel)
            .map(Vec::as_slice)
            .ok_or(KpiError::Signal(SignalError::MissingChannel(channel)))
    }

    /// First sample of the look-back windows (`M0 - time_idx_offset`).
    pub fn lookback_start(&self) -> usize {
        self.start.index.saturating_sub(self.params.time_idx_offset)
    }
}

/// Largest absolute sample at or after `from`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbsPeak {
    pub index: usize,
    pub value: f64,
}

pub fn abs_peak(samples: &[f64], from: usize) -> KpiResult<AbsPeak> {
    if from >= samples.len() {
        return Err(KpiError::IndexOutOfRange {
            index: from,
            len: samples.len(),
            context: "peak search start",
        });
    }
    samples[from..]
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<AbsPeak>, (offset, v)| {
            let value = v.abs();
            match best {
                Some(b) if b.value >= value => Some(b),
                _ => Some(AbsPeak {
                    index: from + offset,
                    value,
                }),
            }
        })
        .ok_or(KpiError::NotDetected("no finite sample in peak window"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_peak_skips_nan_and_prefers_first() {
        let samples = [1.0, -4.0, f64::NAN, 4.0, 2.0];
        assert_eq!(abs_peak(&samples, 0).unwrap(), AbsPeak { index: 1, value: 4.0 });
        assert_eq!(abs_peak(&samples, 2).unwrap().index, 3);
        assert!(matches!(
            abs_peak(&samples, 5),
            Err(KpiError::IndexOutOfRange { index: 5, len: 5, .. })
        ));
        assert!(matches!(abs_peak(&[f64::NAN], 0), Err(KpiError::NotDetected(_))));
    }
}
