//! Batch orchestration: recordings -> event windows -> KPI records.
//!
//! Overview
//! - Segmentation runs once per recording, sequentially.
//! - KPI extraction runs per window; with the `parallel` feature windows and
//!   recordings are processed on the rayon pool. Results are collected in
//!   input order, so the table is ordered by recording, then by event.
//! - A recording that fails to load or to segment is reported and skipped;
//!   the batch continues.

mod report;
mod timing;

pub use report::{BatchReport, RecordingStatus, RecordingSummary};
pub use timing::{StageTiming, TimingBreakdown};

use crate::calibration::CalibrationSet;
use crate::config::RuntimeConfig;
use crate::error::{LoadError, SignalResult};
use crate::io::{recording_stem, write_window_csv, SignalSource};
use crate::kpi::KpiEngine;
use crate::record::{KpiRecord, ResultTable};
use crate::segmenter::EventSegmenter;
use crate::types::{EventWindow, Signal};
use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Label of the `ordinal`-th event of recording `stem`.
pub fn event_label(stem: &str, ordinal: usize) -> String {
    format!("{stem}_aeb_{ordinal:02}")
}

/// Windows and records produced from one recording.
#[derive(Clone, Debug)]
pub struct RecordingOutcome {
    pub windows: Vec<EventWindow>,
    pub records: Vec<KpiRecord>,
    /// Windows that held no intervention start
    pub dropped: usize,
    pub timing: TimingBreakdown,
}

pub struct AebPipeline {
    segmenter: EventSegmenter,
    engine: KpiEngine,
    windows_dir: Option<PathBuf>,
}

impl AebPipeline {
    pub fn new(segmenter: EventSegmenter, engine: KpiEngine) -> Self {
        Self {
            segmenter,
            engine,
            windows_dir: None,
        }
    }

    /// Persist every cut window as `<dir>/<label>.csv`.
    pub fn with_windows_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.windows_dir = Some(dir.into());
        self
    }

    /// Build segmenter and engine from a runtime configuration, loading the
    /// calibration tables and the schema it points to.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, LoadError> {
        let calibration: CalibrationSet = config.load_calibration()?;
        let schema = config.load_schema()?;
        let engine = KpiEngine::new(config.kpi.clone(), Arc::new(calibration), Arc::new(schema));
        let pipeline = Self::new(EventSegmenter::new(config.segmenter), engine);
        Ok(match &config.output.windows_dir {
            Some(dir) => pipeline.with_windows_dir(dir),
            None => pipeline,
        })
    }

    pub fn segmenter(&self) -> &EventSegmenter {
        &self.segmenter
    }

    pub fn engine(&self) -> &KpiEngine {
        &self.engine
    }

    pub fn segment_events(&self, signal: &Signal) -> SignalResult<Vec<EventWindow>> {
        self.segmenter.segment(signal)
    }

    /// Segment `signal` and extract one record per window with an intervention.
    pub fn process_recording(&self, stem: &str, signal: &Signal) -> SignalResult<RecordingOutcome> {
        let start = Instant::now();
        let mut timing = TimingBreakdown::default();
        let windows = timing.time("segment", || self.segment_events(signal))?;

        let extracted = timing.time("kpi", || self.extract_all(stem, signal, &windows))?;
        let dropped = extracted.iter().filter(|r| r.is_none()).count();
        let records: Vec<KpiRecord> = extracted.into_iter().flatten().collect();

        timing.finish(start);
        info!(
            "{stem}: {} windows, {} records ({dropped} dropped) in {:.1} ms",
            windows.len(),
            records.len(),
            timing.total_ms
        );
        Ok(RecordingOutcome {
            windows,
            records,
            dropped,
            timing,
        })
    }

    fn extract_one(
        &self,
        stem: &str,
        signal: &Signal,
        window: &EventWindow,
    ) -> SignalResult<Option<KpiRecord>> {
        let label = event_label(stem, window.ordinal);
        let chunk = signal.slice(window);
        if let Some(dir) = &self.windows_dir {
            let path = dir.join(format!("{label}.csv"));
            if let Err(err) = write_window_csv(&path, &chunk) {
                warn!("{label}: cannot persist window: {err}");
            }
        }
        self.engine.extract(&label, &chunk)
    }

    #[cfg(feature = "parallel")]
    fn extract_all(
        &self,
        stem: &str,
        signal: &Signal,
        windows: &[EventWindow],
    ) -> SignalResult<Vec<Option<KpiRecord>>> {
        windows
            .par_iter()
            .map(|window| self.extract_one(stem, signal, window))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn extract_all(
        &self,
        stem: &str,
        signal: &Signal,
        windows: &[EventWindow],
    ) -> SignalResult<Vec<Option<KpiRecord>>> {
        windows
            .iter()
            .map(|window| self.extract_one(stem, signal, window))
            .collect()
    }

    fn run_one<S: SignalSource + ?Sized>(&self, source: &S, path: &Path) -> (RecordingSummary, Vec<KpiRecord>) {
        let label = recording_stem(path);
        let summary = |status, windows, timing| RecordingSummary {
            path: path.to_path_buf(),
            label: label.clone(),
            status,
            windows,
            timing,
        };
        let signal = match source.load(path) {
            Ok(signal) => signal,
            Err(err) => {
                warn!("{}: skipped, {err}", path.display());
                let status = RecordingStatus::LoadFailed {
                    reason: err.to_string(),
                };
                return (summary(status, Vec::new(), TimingBreakdown::default()), Vec::new());
            }
        };
        match self.process_recording(&label, &signal) {
            Ok(outcome) => {
                let status = RecordingStatus::Processed {
                    windows: outcome.windows.len(),
                    records: outcome.records.len(),
                    dropped: outcome.dropped,
                };
                (summary(status, outcome.windows, outcome.timing), outcome.records)
            }
            Err(err) => {
                warn!("{}: skipped, {err}", path.display());
                let status = RecordingStatus::SignalFailed {
                    reason: err.to_string(),
                };
                (summary(status, Vec::new(), TimingBreakdown::default()), Vec::new())
            }
        }
    }

    /// Process `paths` in order and collect every record into one table.
    pub fn run_batch<S: SignalSource + ?Sized>(&self, source: &S, paths: &[PathBuf]) -> BatchReport {
        let start = Instant::now();

        #[cfg(feature = "parallel")]
        let results: Vec<(RecordingSummary, Vec<KpiRecord>)> = paths
            .par_iter()
            .map(|path| self.run_one(source, path))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<(RecordingSummary, Vec<KpiRecord>)> = paths
            .iter()
            .map(|path| self.run_one(source, path))
            .collect();

        let mut table = ResultTable::new(self.engine.schema().clone());
        let mut recordings = Vec::with_capacity(results.len());
        let mut timing = TimingBreakdown::default();
        for (summary, records) in results {
            timing.push(summary.label.clone(), summary.timing.total_ms);
            for record in records {
                if let Err(err) = table.append(record) {
                    warn!("{}: record rejected: {err}", summary.label);
                }
            }
            recordings.push(summary);
        }
        timing.finish(start);

        let report = BatchReport {
            table,
            recordings,
            timing,
        };
        info!(
            "batch: {} recordings, {} records, {} failed, {:.1} ms",
            paths.len(),
            report.table.len(),
            report.failed().count(),
            report.timing.total_ms
        );
        report
    }
}
