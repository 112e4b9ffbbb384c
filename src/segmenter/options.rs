use serde::{Deserialize, Serialize};

/// Thresholds and padding used to cut event windows out of a recording.
///
/// - `start_delta`: per-sample drop of the deceleration request that marks a
///   trigger (a step from the idle value down to a braking value).
/// - `start_confirm`: the request must be below this value right after the
///   drop, which filters out noise and non-braking steps.
/// - `end_delta` / `end_confirm`: per-sample rise and the post-rise level
///   confirming a release back to idle.
/// - `fallback_end_offset_s`: synthetic release offset when a recording holds
///   triggers but no release (trimmed logs).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterOptions {
    /// Seconds of pre-roll before the trigger.
    pub pre_time_s: f64,
    /// Seconds of post-roll after the release.
    pub post_time_s: f64,
    pub start_delta: f64,
    pub start_confirm: f64,
    pub end_delta: f64,
    pub end_confirm: f64,
    pub fallback_end_offset_s: f64,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            pre_time_s: 4.0,
            post_time_s: 3.0,
            start_delta: -30.0,
            start_confirm: -5.9,
            end_delta: 20.0,
            end_confirm: 20.0,
            fallback_end_offset_s: 7.0,
        }
    }
}
