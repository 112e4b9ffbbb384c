use super::context::EventContext;
use super::{fields, KpiGroup};
use crate::error::KpiResult;
use crate::record::KpiFields;
use crate::types::Channel;

/// Partial/full braking phases after M0.
///
/// Partial braking only counts samples before the first full-braking
/// sample, so an escalation that skips the partial level reports PB off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrakeModeKpis {
    pub pb_on: bool,
    pub fb_on: bool,
    pub pb_duration: f64,
    pub fb_duration: f64,
}

impl KpiGroup for BrakeModeKpis {
    const NAME: &'static str = "brake mode";
    const FIELDS: &'static [&'static str] =
        &[fields::IS_PB_ON, fields::IS_FB_ON, fields::PB_DUR, fields::FB_DUR];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let decel = ctx.raw(Channel::TargetDecel)?;
        let time = ctx.time();
        let params = ctx.params;
        let in_band = |value: f64, target: f64| (value - target).abs() <= params.tgt_tol;

        let from = ctx.start.index;
        let fb: Vec<usize> = (from..decel.len())
            .filter(|&i| in_band(decel[i], params.fb_tgt_decel))
            .collect();
        let pb_end = fb.first().copied().unwrap_or(decel.len());
        let pb: Vec<usize> = (from..pb_end)
            .filter(|&i| in_band(decel[i], params.pb_tgt_decel))
            .collect();

        let span = |idx: &[usize]| match (idx.first(), idx.last()) {
            (Some(&first), Some(&last)) => time[last] - time[first],
            _ => 0.0,
        };
        Ok(Self {
            pb_on: !pb.is_empty(),
            fb_on: !fb.is_empty(),
            pb_duration: span(&pb),
            fb_duration: span(&fb),
        })
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::IS_PB_ON, self.pb_on);
        out.set(fields::IS_FB_ON, self.fb_on);
        out.set(fields::PB_DUR, self.pb_duration);
        out.set(fields::FB_DUR, self.fb_duration);
    }
}
