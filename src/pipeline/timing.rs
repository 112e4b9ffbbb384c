use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock time of one named step (segmentation, KPI extraction, or a
/// whole recording inside a batch).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Per-step timings plus the total of the enclosing run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms,
        });
    }

    /// Run `f` and record its duration under `label`.
    pub fn time<T>(&mut self, label: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.push(label, elapsed_ms(start));
        out
    }

    /// Close the breakdown: `total_ms` becomes the time since `start`.
    pub fn finish(&mut self, start: Instant) {
        self.total_ms = elapsed_ms(start);
    }

    /// Duration of the first step named `label`.
    pub fn stage(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
