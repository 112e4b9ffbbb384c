use super::timing::TimingBreakdown;
use crate::record::ResultTable;
use crate::types::EventWindow;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one recording of a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordingStatus {
    Processed {
        windows: usize,
        records: usize,
        /// Windows without an intervention start
        dropped: usize,
    },
    LoadFailed {
        reason: String,
    },
    SignalFailed {
        reason: String,
    },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub label: String,
    #[serde(flatten)]
    pub status: RecordingStatus,
    pub windows: Vec<EventWindow>,
    pub timing: TimingBreakdown,
}

/// Result of a batch run: the KPI table plus per-recording bookkeeping.
#[derive(Clone, Debug)]
pub struct BatchReport {
    pub table: ResultTable,
    pub recordings: Vec<RecordingSummary>,
    pub timing: TimingBreakdown,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &RecordingSummary> {
        self.recordings
            .iter()
            .filter(|r| !matches!(r.status, RecordingStatus::Processed { .. }))
    }
}
