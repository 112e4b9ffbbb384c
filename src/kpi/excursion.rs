//! Lateral excursions: lateral acceleration (prefiltered, m/s²) and yaw rate
//! (rad/s, reported in deg/s), both peaked from `M0 - time_idx_offset`.

use super::context::{abs_peak, EventContext};
use super::thresholds::exceeds;
use super::{fields, KpiGroup};
use crate::error::KpiResult;
use crate::record::KpiFields;
use crate::types::Channel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatAccelKpis {
    pub peak: f64,
    pub is_high: Option<bool>,
}

impl KpiGroup for LatAccelKpis {
    const NAME: &'static str = "lateral acceleration";
    const FIELDS: &'static [&'static str] = &[fields::ABS_LAT_ACCEL_MAX, fields::IS_LAT_ACCEL_HIGH];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let accel = ctx.filtered(Channel::LatAccel)?;
        let peak = abs_peak(accel, ctx.lookback_start())?.value;
        Ok(Self {
            peak,
            is_high: exceeds(peak, ctx.thresholds.lat_accel),
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::ABS_LAT_ACCEL_MAX, self.peak);
        out.set(fields::IS_LAT_ACCEL_HIGH, self.is_high);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YawRateKpis {
    pub peak_deg_s: f64,
    pub is_high: Option<bool>,
}

impl KpiGroup for YawRateKpis {
    const NAME: &'static str = "yaw rate";
    const FIELDS: &'static [&'static str] = &[fields::ABS_YAW_RATE_MAX, fields::IS_YAW_RATE_HIGH];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let yaw = ctx.raw(Channel::YawRate)?;
        let peak_deg_s = abs_peak(yaw, ctx.lookback_start())?.value.to_degrees();
        Ok(Self {
            peak_deg_s,
            is_high: exceeds(peak_deg_s, ctx.thresholds.yaw_rate),
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::ABS_YAW_RATE_MAX, self.peak_deg_s);
        out.set(fields::IS_YAW_RATE_HIGH, self.is_high);
    }
}
