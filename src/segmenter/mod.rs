//! Event segmentation: cut one window per AEB trigger out of a recording.
//!
//! Overview
//! - Triggers and releases are detected on the deceleration-request channel
//!   (see [`EventCandidates`]).
//! - For every trigger `i`, the window opens `pre_time_s` before it. The first
//!   unconsumed release whose padded stop (`release + post_time_s`) lands
//!   between this window's start and the next trigger's window start closes
//!   it. Without a matching release the window closes `post_time_s` after
//!   the trigger.
//! - Releases are consumed through a single forward-only cursor: every
//!   release the search passes over, including those outside the bounds, is
//!   used up and never matched to a later trigger.
//!
//! Windows are produced lazily by [`EventWindows`]; calling
//! [`EventSegmenter::segments`] again restarts from the first trigger.

mod candidates;
mod options;

pub use candidates::EventCandidates;
pub use options::SegmenterOptions;

use crate::error::{SignalError, SignalResult};
use crate::types::{nearest_index, Channel, EventWindow, Signal};
use log::{debug, warn};

/// Splits recordings into event windows.
#[derive(Clone, Debug, Default)]
pub struct EventSegmenter {
    options: SegmenterOptions,
}

impl EventSegmenter {
    pub fn new(options: SegmenterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SegmenterOptions {
        &self.options
    }

    /// Trigger/release candidates of `signal`.
    pub fn candidates(&self, signal: &Signal) -> SignalResult<EventCandidates> {
        let decel = signal.require(Channel::TargetDecel)?;
        Ok(candidates::detect(signal.time(), decel, &self.options))
    }

    /// Lazily iterate over the event windows of `signal`.
    ///
    /// Fails when the deceleration-request channel is missing; the length
    /// invariant is guaranteed by [`Signal`] construction.
    pub fn segments<'a>(&self, signal: &'a Signal) -> SignalResult<EventWindows<'a>> {
        if !signal.has(Channel::TargetDecel) {
            return Err(SignalError::MissingChannel(Channel::TargetDecel));
        }
        let candidates = self.candidates(signal)?;
        debug!(
            "segmenter: {} start / {} end candidates{}",
            candidates.start_times.len(),
            candidates.end_times.len(),
            if candidates.synthetic_ends {
                " (synthetic ends)"
            } else {
                ""
            }
        );
        Ok(EventWindows {
            time: signal.time(),
            options: self.options,
            candidates,
            next_start: 0,
            end_cursor: 0,
        })
    }

    /// Collect all event windows of `signal`.
    pub fn segment(&self, signal: &Signal) -> SignalResult<Vec<EventWindow>> {
        Ok(self.segments(signal)?.collect())
    }
}

/// Iterator over the event windows of one recording.
pub struct EventWindows<'a> {
    time: &'a [f64],
    options: SegmenterOptions,
    candidates: EventCandidates,
    next_start: usize,
    end_cursor: usize,
}

impl EventWindows<'_> {
    pub fn candidates(&self) -> &EventCandidates {
        &self.candidates
    }

    /// Current position of the end-candidate cursor.
    pub fn end_cursor(&self) -> usize {
        self.end_cursor
    }

    fn index_at(&self, t: f64) -> usize {
        nearest_index(self.time, t).unwrap_or(0)
    }

    /// Match the first unconsumed release whose padded stop lies in
    /// `[window_start, limit]`.
    ///
    /// Every release inspected is consumed, matched or not, so a release is
    /// never offered to a later trigger.
    fn match_release(&mut self, window_start: usize, limit: usize) -> Option<(usize, usize)> {
        while self.end_cursor < self.candidates.end_times.len() {
            let j = self.end_cursor;
            self.end_cursor += 1;
            let stop = self.index_at(self.candidates.end_times[j] + self.options.post_time_s);
            if (window_start..=limit).contains(&stop) {
                return Some((j, stop));
            }
        }
        None
    }

    fn cut(&mut self, i: usize) -> Option<EventWindow> {
        let starts = &self.candidates.start_times;
        let trigger = starts[i];
        let last = self.time.len() - 1;

        let window_start = self.index_at(trigger - self.options.pre_time_s);
        let next_window_start = starts
            .get(i + 1)
            .map(|&next| self.index_at(next - self.options.pre_time_s))
            .unwrap_or(last);

        let (end_candidate, stop) = match self.match_release(window_start, next_window_start) {
            Some((j, stop)) => (Some(j), stop),
            None => (None, self.index_at(trigger + self.options.post_time_s)),
        };
        let stop = stop.min(last);

        if stop <= window_start {
            warn!(
                "segmenter: skipping degenerate window for trigger {} at {:.3}s ({} -> {})",
                i + 1,
                trigger,
                window_start,
                stop
            );
            return None;
        }

        Some(EventWindow {
            ordinal: i + 1,
            start: window_start,
            stop,
            start_time: self.time[window_start],
            stop_time: self.time[stop],
            trigger_time: trigger,
            end_candidate,
            end_cursor: self.end_cursor,
        })
    }
}

impl Iterator for EventWindows<'_> {
    type Item = EventWindow;

    fn next(&mut self) -> Option<EventWindow> {
        if self.time.is_empty() {
            return None;
        }
        while self.next_start < self.candidates.start_times.len() {
            let i = self.next_start;
            self.next_start += 1;
            if let Some(window) = self.cut(i) {
                return Some(window);
            }
        }
        None
    }
}
