//! Per-event KPI extraction.
//!
//! Overview
//! - [`KpiEngine::extract`] locates M0 and M2 in one event window, resolves
//!   the speed-dependent thresholds at M0 and builds an [`EventContext`] with
//!   the acceleration channels low-passed once.
//! - Every KPI group ([`KpiGroup`]) computes from the shared context only and
//!   writes its own fields. A failing group leaves exactly its fields missing
//!   and logs a warning; the rest of the record is unaffected.
//! - A window without an intervention start yields no record.

mod brake_mode;
mod context;
mod distance;
mod excursion;
pub mod fields;
mod latency;
mod options;
mod steering;
mod thresholds;
mod throttle;

pub use brake_mode::BrakeModeKpis;
pub use context::{abs_peak, AbsPeak, EventContext};
pub use distance::DistanceKpis;
pub use excursion::{LatAccelKpis, YawRateKpis};
pub use latency::{CommLatencyKpis, ResponseKpis};
pub use options::{CalibrationKeys, KpiParams};
pub use steering::{SteerAngleKpis, SteerRateKpis};
pub use thresholds::{exceeds, Thresholds};
pub use throttle::ThrottleKpis;

use crate::calibration::CalibrationSet;
use crate::error::{KpiResult, SignalResult};
use crate::locator::InterventionLocator;
use crate::record::{KpiFields, KpiRecord, KpiSchema};
use crate::types::{Channel, EventWindow, Signal};
use log::{debug, warn};
use std::sync::Arc;

/// One independently failing block of KPI fields.
pub trait KpiGroup: Sized {
    const NAME: &'static str;
    /// Every field `write` may set.
    const FIELDS: &'static [&'static str];

    fn compute(ctx: &EventContext<'_>) -> KpiResult<Self>;
    fn write(&self, out: &mut KpiFields);
}

fn run_group<G: KpiGroup>(ctx: &EventContext<'_>, out: &mut KpiFields) {
    match G::compute(ctx) {
        Ok(group) => group.write(out),
        Err(err) => {
            warn!("{}: {} KPIs missing: {err}", ctx.label, G::NAME);
            for name in G::FIELDS {
                out.missing(name);
            }
        }
    }
}

/// Turns event windows into KPI records.
#[derive(Clone, Debug)]
pub struct KpiEngine {
    params: KpiParams,
    locator: InterventionLocator,
    calibration: Arc<CalibrationSet>,
    schema: Arc<KpiSchema>,
}

impl KpiEngine {
    pub fn new(params: KpiParams, calibration: Arc<CalibrationSet>, schema: Arc<KpiSchema>) -> Self {
        let locator = params.locator();
        Self {
            params,
            locator,
            calibration,
            schema,
        }
    }

    pub fn params(&self) -> &KpiParams {
        &self.params
    }

    pub fn schema(&self) -> &Arc<KpiSchema> {
        &self.schema
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    /// KPIs of the `window` cut out of `signal`.
    pub fn extract_window(
        &self,
        label: &str,
        signal: &Signal,
        window: &EventWindow,
    ) -> SignalResult<Option<KpiRecord>> {
        self.extract(label, &signal.slice(window))
    }

    /// KPIs of one event window.
    ///
    /// `Ok(None)` when the window holds no intervention start. Missing
    /// request or speed channels fail the whole event.
    pub fn extract(&self, label: &str, window: &Signal) -> SignalResult<Option<KpiRecord>> {
        let Some(start) = self.locator.locate_start(window)? else {
            warn!("{label}: no intervention start in window, event dropped");
            return Ok(None);
        };
        let end = self.locator.locate_end(window, start.index)?;
        let speed_kph = window.require(Channel::EgoSpeed)?[start.index] * self.params.speed_to_kph;
        let thresholds =
            Thresholds::resolve(&self.calibration, &self.params.calibration_keys, speed_kph);
        debug!(
            "{label}: M0={:.3}s M2={:.3}s ({:?}) speed={:.1}kph",
            start.time, end.time, end.cause, speed_kph
        );

        let ctx = EventContext::new(label, window, start, end, &self.params, thresholds);
        let mut out = KpiRecord::builder(self.schema.clone());
        out.set(fields::LABEL, label);
        out.set(fields::LOG_TIME, window.time().first().copied());
        out.set(fields::VEH_SPD, speed_kph);
        out.set(fields::INTV_START_TIME, start.time);
        out.set(fields::INTV_END_TIME, end.time);
        out.set(fields::INTV_DUR, end.time - start.time);
        out.set(fields::VEH_STOP_CHECK, end.vehicle_stopped);
        thresholds.write(&mut out);

        run_group::<ResponseKpis>(&ctx, &mut out);
        run_group::<ThrottleKpis>(&ctx, &mut out);
        run_group::<SteerAngleKpis>(&ctx, &mut out);
        run_group::<SteerRateKpis>(&ctx, &mut out);
        run_group::<LatAccelKpis>(&ctx, &mut out);
        run_group::<YawRateKpis>(&ctx, &mut out);
        run_group::<BrakeModeKpis>(&ctx, &mut out);
        run_group::<CommLatencyKpis>(&ctx, &mut out);
        run_group::<DistanceKpis>(&ctx, &mut out);

        Ok(Some(out.build()))
    }
}
