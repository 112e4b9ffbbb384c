//! Driver steering during the intervention.
//!
//! Both peaks are searched from `M0 - time_idx_offset` to the window end and
//! reported in degrees (source channels are in radians).

use super::context::{abs_peak, EventContext};
use super::thresholds::exceeds;
use super::{fields, KpiGroup};
use crate::error::KpiResult;
use crate::record::KpiFields;
use crate::types::Channel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteerAngleKpis {
    pub peak_deg: f64,
    pub is_high: Option<bool>,
}

impl KpiGroup for SteerAngleKpis {
    const NAME: &'static str = "steering angle";
    const FIELDS: &'static [&'static str] = &[fields::ABS_STEER_MAX, fields::IS_STEER_HIGH];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let angle = ctx.raw(Channel::SteerAngle)?;
        let peak_deg = abs_peak(angle, ctx.lookback_start())?.value.to_degrees();
        Ok(Self {
            peak_deg,
            is_high: exceeds(peak_deg, ctx.thresholds.steer_angle),
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::ABS_STEER_MAX, self.peak_deg);
        out.set(fields::IS_STEER_HIGH, self.is_high);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteerRateKpis {
    pub peak_deg_s: f64,
    pub is_high: Option<bool>,
}

impl KpiGroup for SteerRateKpis {
    const NAME: &'static str = "steering rate";
    const FIELDS: &'static [&'static str] = &[fields::ABS_STEER_RATE_MAX, fields::IS_STEER_RATE_HIGH];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let rate = ctx.raw(Channel::SteerRate)?;
        let peak_deg_s = abs_peak(rate, ctx.lookback_start())?.value.to_degrees();
        Ok(Self {
            peak_deg_s,
            is_high: exceeds(peak_deg_s, ctx.thresholds.steer_rate),
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::ABS_STEER_RATE_MAX, self.peak_deg_s);
        out.set(fields::IS_STEER_RATE_HIGH, self.is_high);
    }
}
