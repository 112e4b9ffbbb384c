//! Response timing.
//!
//! - [`ResponseKpis`]: M1, the knee of the prefiltered longitudinal
//!   acceleration within `latency_window_samples` after M0, and the dead
//!   time M1 - M0.
//! - [`CommLatencyKpis`]: delay between the full-braking request (after a
//!   sustained partial-braking phase) and the jerk onset it produces.

use super::context::EventContext;
use super::{fields, KpiGroup};
use crate::error::{KpiError, KpiResult};
use crate::filter::gradient;
use crate::kneepoint::{locate_knee, KneeDirection};
use crate::record::KpiFields;
use crate::types::Channel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponseKpis {
    /// M1 timestamp
    pub response_time: f64,
    pub dead_time: f64,
}

impl KpiGroup for ResponseKpis {
    const NAME: &'static str = "system response";
    const FIELDS: &'static [&'static str] = &[fields::SYS_RESP_TIME, fields::DEAD_TIME];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let accel = ctx.filtered(Channel::LongAccel)?;
        let time = ctx.time();
        let m0 = ctx.start.index;
        if m0 + 1 >= time.len() {
            return Err(KpiError::IndexOutOfRange {
                index: m0 + 1,
                len: time.len(),
                context: "M1 search window",
            });
        }
        let stop = (m0 + ctx.params.latency_window_samples).min(time.len() - 1);
        let knee = locate_knee(
            time,
            accel,
            m0..=stop,
            KneeDirection::Negative,
            ctx.params.knee_method,
        )?;
        Ok(Self {
            response_time: knee.time,
            dead_time: knee.time - ctx.start.time,
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::SYS_RESP_TIME, self.response_time);
        out.set(fields::DEAD_TIME, self.dead_time);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommLatencyKpis {
    pub latency: f64,
    /// Index of the first full-braking request sample
    pub fb_start: usize,
}

impl KpiGroup for CommLatencyKpis {
    const NAME: &'static str = "communication latency";
    const FIELDS: &'static [&'static str] = &[fields::COMM_LATENCY];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let decel = ctx.raw(Channel::TargetDecel)?;
        let accel = ctx.filtered(Channel::LongAccel)?;
        let time = ctx.time();
        let params = ctx.params;
        let n = decel.len();

        let dt = ctx
            .signal
            .mean_sample_period()
            .filter(|dt| *dt > 0.0)
            .ok_or(KpiError::NotDetected("degenerate time base"))?;
        let min_run = ((params.pb_duration_s / dt).floor() as usize).max(1);
        let is_pb = |v: f64| (v - params.pb_tgt_decel).abs() <= params.tgt_tol;
        let is_fb = |v: f64| (v - params.fb_tgt_decel).abs() <= params.tgt_tol;

        let pb_end = sustained_run_end(&decel[ctx.start.index..], min_run, is_pb)
            .map(|end| ctx.start.index + end)
            .ok_or(KpiError::NotDetected("no sustained partial braking"))?;
        let fb_start = (pb_end + 1..n)
            .find(|&i| is_fb(decel[i]))
            .ok_or(KpiError::NotDetected("no full braking after partial braking"))?;

        let stop = (fb_start + params.latency_window_samples).min(n - 1);
        let jerk = gradient(&accel[fb_start..=stop], &time[fb_start..=stop]);
        let onset = jerk
            .iter()
            .position(|&j| j < params.aeb_jerk_neg_thd)
            .ok_or(KpiError::NotDetected("no jerk onset after full braking"))?;

        Ok(Self {
            latency: (time[fb_start + onset] - time[fb_start]).max(0.0),
            fb_start,
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::COMM_LATENCY, self.latency);
    }
}

/// Last index of the first run of `pred` samples that is at least `min_len` long.
fn sustained_run_end(samples: &[f64], min_len: usize, pred: impl Fn(f64) -> bool) -> Option<usize> {
    let mut run_start = None;
    for (i, &v) in samples.iter().enumerate() {
        if !pred(v) {
            if let Some(start) = run_start.take() {
                if i - start >= min_len {
                    return Some(i - 1);
                }
            }
            continue;
        }
        run_start.get_or_insert(i);
    }
    run_start
        .filter(|&start| samples.len() - start >= min_len)
        .map(|_| samples.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sustained_run_skips_short_blips() {
        let x = [0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0];
        let on = |v: f64| v > 0.5;
        assert_eq!(sustained_run_end(&x, 2, on), Some(5));
        assert_eq!(sustained_run_end(&x, 1, on), Some(1));
        assert_eq!(sustained_run_end(&x, 4, on), None);
        assert_eq!(sustained_run_end(&[1.0, 1.0], 2, on), Some(1));
    }
}
