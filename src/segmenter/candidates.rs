use super::SegmenterOptions;
use serde::Serialize;

/// Trigger and release times found in one deceleration-request trace.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCandidates {
    pub start_times: Vec<f64>,
    pub end_times: Vec<f64>,
    /// True when `end_times` were synthesised from the start times.
    pub synthetic_ends: bool,
}

/// Scan `decel` for trigger and release candidates.
///
/// A trigger sits wherever the mask `diff(decel) < start_delta` toggles and
/// the next request sample is below `start_confirm`; both edges of a run are
/// examined so multi-sample drops are still caught on their trailing edge.
/// A release is any sample whose delta exceeds `end_delta` with the next
/// request sample above `end_confirm`.
pub(crate) fn detect(time: &[f64], decel: &[f64], options: &SegmenterOptions) -> EventCandidates {
    let n = time.len().min(decel.len());
    if n < 2 {
        return EventCandidates::default();
    }
    let delta: Vec<f64> = decel[..n].windows(2).map(|w| w[1] - w[0]).collect();
    let below: Vec<bool> = delta.iter().map(|&d| d < options.start_delta).collect();

    let start_times: Vec<f64> = below
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] != pair[1])
        .map(|(t, _)| t)
        .filter(|&t| decel[t + 1] < options.start_confirm)
        .map(|t| time[t])
        .collect();

    let mut end_times: Vec<f64> = delta
        .iter()
        .enumerate()
        .filter(|&(t, &d)| d > options.end_delta && decel[t + 1] > options.end_confirm)
        .map(|(t, _)| time[t])
        .collect();

    let synthetic_ends = end_times.is_empty() && !start_times.is_empty();
    if synthetic_ends {
        end_times = start_times
            .iter()
            .map(|t| t + options.fallback_end_offset_s)
            .collect();
    }

    EventCandidates {
        start_times,
        end_times,
        synthetic_ends,
    }
}
