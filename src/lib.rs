#![doc = include_str!("../README.md")]

// Core algorithms
pub mod calibration;
pub mod filter;
pub mod kneepoint;
pub mod kpi;
pub mod locator;
pub mod segmenter;
pub mod types;

// Records, I/O and orchestration around the core
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod record;

// --- High-level re-exports -------------------------------------------------

pub use crate::calibration::{CalibrationCurve, CalibrationSet};
pub use crate::error::{
    CalibrationError, KneepointError, KpiError, LoadError, SchemaError, SignalError,
};
pub use crate::kpi::{KpiEngine, KpiParams};
pub use crate::locator::InterventionLocator;
pub use crate::pipeline::{AebPipeline, BatchReport};
pub use crate::record::{KpiRecord, KpiSchema, KpiValue, ResultTable};
pub use crate::segmenter::{EventSegmenter, SegmenterOptions};
pub use crate::types::{Channel, EventWindow, Signal};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for scripts and tests.
///
/// ```no_run
/// use aeb_kpi::prelude::*;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let signal = CsvSignalSource::default().load(Path::new("drive.csv"))?;
/// let engine = KpiEngine::new(
///     KpiParams::default(),
///     Arc::new(CalibrationSet::new()),
///     Arc::new(aeb_schema()),
/// );
/// let pipeline = AebPipeline::new(EventSegmenter::default(), engine);
/// let outcome = pipeline.process_recording("drive", &signal)?;
/// println!("{} events", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::io::{CsvSignalSource, SignalSource};
    pub use crate::kpi::fields::aeb_schema;
    pub use crate::{
        AebPipeline, CalibrationSet, Channel, EventSegmenter, KpiEngine, KpiParams, Signal,
    };
}
