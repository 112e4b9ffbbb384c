use crate::calibration::{load_calibration, CalibrationSet};
use crate::error::LoadError;
use crate::io::{ChannelMap, DecoderConfig};
use crate::kpi::{fields, KpiParams};
use crate::record::KpiSchema;
use crate::segmenter::SegmenterOptions;
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// KPI table as CSV
    pub csv_out: Option<PathBuf>,
    /// KPI table as JSON
    pub json_out: Option<PathBuf>,
    /// Event windows persisted as CSV for audit
    pub windows_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub input_dir: PathBuf,
    /// Extension of the recordings picked up under `input_dir`
    pub recording_extension: String,
    pub output: OutputConfig,
    pub channels: ChannelMap,
    pub segmenter: SegmenterOptions,
    pub kpi: KpiParams,
    /// Calibration tables; without them every exceedance flag is missing
    pub calibration: Option<PathBuf>,
    /// Curves stored as fractions that must be compared in percent
    pub percent_curves: Vec<String>,
    /// Schema document; the built-in AEB schema is used when absent
    pub schema: Option<PathBuf>,
    pub feature: String,
    pub decoder: Option<DecoderConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let kpi = KpiParams::default();
        let percent_curves = vec![kpi.calibration_keys.pedal_increase.clone()];
        Self {
            input_dir: PathBuf::from("."),
            recording_extension: "csv".to_string(),
            output: OutputConfig::default(),
            channels: ChannelMap::default(),
            segmenter: SegmenterOptions::default(),
            kpi,
            calibration: None,
            percent_curves,
            schema: None,
            feature: fields::AEB_FEATURE.to_string(),
            decoder: None,
        }
    }
}

impl RuntimeConfig {
    /// Relative paths in the config resolve against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.input_dir);
        for path in [
            &mut self.output.csv_out,
            &mut self.output.json_out,
            &mut self.output.windows_dir,
            &mut self.calibration,
            &mut self.schema,
        ]
        .into_iter()
        .flatten()
        {
            join(path);
        }
    }

    pub fn load_calibration(&self) -> Result<CalibrationSet, LoadError> {
        let Some(path) = &self.calibration else {
            info!("no calibration configured, exceedance flags will be missing");
            return Ok(CalibrationSet::new());
        };
        let mut set = load_calibration(path)?;
        set.scale_percent_curves(&self.percent_curves);
        info!("loaded {} calibration curves from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn load_schema(&self) -> Result<KpiSchema, LoadError> {
        match &self.schema {
            Some(path) => Ok(KpiSchema::load(path, &self.feature)?),
            None => Ok(fields::aeb_schema()),
        }
    }
}

/// Read a [`RuntimeConfig`]; relative paths are taken relative to the
/// config file.
pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let mut config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aeb.json");
        fs::write(
            &path,
            r#"{
                "input_dir": "logs",
                "output": {"csv_out": "out/kpi.csv"},
                "segmenter": {"pre_time_s": 2.0},
                "kpi": {"cutoff_hz": 5.0, "calibration_keys": {"lat_accel": "LatAcc"}},
                "channels": {"time": "t"}
            }"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.input_dir, dir.path().join("logs"));
        assert_eq!(config.output.csv_out, Some(dir.path().join("out/kpi.csv")));
        assert_eq!(config.segmenter.pre_time_s, 2.0);
        assert_eq!(config.segmenter.post_time_s, 3.0);
        assert_eq!(config.kpi.cutoff_hz, 5.0);
        assert_eq!(config.kpi.pb_tgt_decel, -6.0);
        assert_eq!(config.kpi.calibration_keys.lat_accel, "LatAcc");
        assert_eq!(config.kpi.calibration_keys.yaw_rate, "YawrateSuspension_Th");
        assert_eq!(config.channels.time, "t");
        assert_eq!(config.channels.ego_speed, "egoSpeed");
        assert_eq!(config.recording_extension, "csv");
        assert_eq!(config.feature, "AEB");
        assert!(config.load_calibration().unwrap().is_empty());
        assert_eq!(config.load_schema().unwrap(), fields::aeb_schema());
    }

    #[test]
    fn malformed_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }
}
