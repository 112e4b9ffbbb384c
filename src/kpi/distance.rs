use super::context::EventContext;
use super::{fields, KpiGroup};
use crate::error::KpiResult;
use crate::record::KpiFields;
use crate::types::Channel;

/// Longitudinal clearance to the target object.
///
/// A gap of exactly zero means no object is tracked, so those samples never
/// produce a distance; the affected fields are left missing instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceKpis {
    /// Gap at the first tracked sample in `[window start, M2]`
    pub first_detection: Option<f64>,
    /// Gap where the track that is still held at M2 was picked up
    pub stable_detection: Option<f64>,
    pub at_intervention: Option<f64>,
    pub at_stop: Option<f64>,
}

fn tracked(gap: f64) -> bool {
    gap.is_finite() && gap != 0.0
}

impl DistanceKpis {
    /// Clearance KPIs of a gap trace with markers `m0 <= m2 < gap.len()`.
    pub fn from_gap(gap: &[f64], m0: usize, m2: usize) -> Self {
        let until_stop = &gap[..=m2];
        let held_at_stop = until_stop
            .iter()
            .rev()
            .take_while(|&&g| tracked(g))
            .count();
        let stable_detection = (held_at_stop > 0).then(|| until_stop[m2 + 1 - held_at_stop]);

        Self {
            first_detection: until_stop.iter().copied().find(|&g| tracked(g)),
            stable_detection,
            at_intervention: Some(gap[m0]).filter(|&g| tracked(g)),
            at_stop: Some(gap[m2]).filter(|&g| tracked(g)),
        }
    }
}

impl KpiGroup for DistanceKpis {
    const NAME: &'static str = "distance";
    const FIELDS: &'static [&'static str] = &[
        fields::FIRST_DET_DIST,
        fields::STABLE_DET_DIST,
        fields::INTV_DIST,
        fields::STOP_GAP,
    ];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self> {
        let gap = ctx.raw(Channel::LongGap)?;
        Ok(Self::from_gap(gap, ctx.start.index, ctx.end.index))
    }

    fn write(&self, out: &mut KpiFields) {
        out.set(fields::FIRST_DET_DIST, self.first_detection);
        out.set(fields::STABLE_DET_DIST, self.stable_detection);
        out.set(fields::INTV_DIST, self.at_intervention);
        out.set(fields::STOP_GAP, self.at_stop);
    }
}
