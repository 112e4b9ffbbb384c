use super::context::EventContext;
use super::thresholds::exceeds;
use super::{fields, KpiGroup};
use crate::error::{KpiError, KpiResult};
use crate::record::KpiFields;
use crate::types::Channel;

/// Accelerator pedal behaviour between M0 and M2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrottleKpis {
    pub at_start: f64,
    pub max: f64,
    pub increase: f64,
    pub is_high: Option<bool>,
    pub on_at_start: bool,
}

impl KpiGroup for ThrottleKpis {
    const NAME: &'static str = "throttle";
    const FIELDS: &'static [&'static str] = &[
        fields::PEDAL_POS_AT_START,
        fields::PEDAL_POS_MAX,
        fields::PEDAL_POS_INC,
        fields::IS_PEDAL_HIGH,
        fields::IS_PEDAL_ON_AT_START,
    ];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let pedal = ctx.raw(Channel::Throttle)?;
        let (m0, m2) = (ctx.start.index, ctx.end.index);
        let at_start = pedal[m0];
        if !at_start.is_finite() {
            return Err(KpiError::NotDetected("pedal position at M0 is not finite"));
        }
        let max = pedal[m0..=m2]
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(at_start, f64::max);
        let increase = max - at_start;
        Ok(Self {
            at_start,
            max,
            increase,
            is_high: exceeds(increase, ctx.thresholds.pedal_increase),
            on_at_start: at_start != 0.0,
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::PEDAL_POS_AT_START, self.at_start);
        out.set(fields::PEDAL_POS_MAX, self.max);
        out.set(fields::PEDAL_POS_INC, self.increase);
        out.set(fields::IS_PEDAL_HIGH, self.is_high);
        out.set(fields::IS_PEDAL_ON_AT_START, self.on_at_start);
    }
}
