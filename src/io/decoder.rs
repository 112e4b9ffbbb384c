use super::{CsvSignalSource, SignalSource};
use crate::error::LoadError;
use crate::types::Signal;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// External converter invocation.
///
/// `{input}` and `{output}` in `args` are replaced by the raw log path and
/// the CSV path the converter must produce.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory for converted recordings; defaults to the input's directory.
    /// The converter never writes over its own input.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Converts raw logs to CSV with an external program, then loads the CSV.
///
/// Failures surface as [`LoadError::Decoder`]; nothing is retried.
#[derive(Clone, Debug)]
pub struct ExternalDecoder {
    config: DecoderConfig,
    csv: CsvSignalSource,
}

impl ExternalDecoder {
    pub fn new(config: DecoderConfig, csv: CsvSignalSource) -> Self {
        Self { config, csv }
    }

    /// Path of the CSV produced for `input`: `<stem>.csv`, or
    /// `<stem>.decoded.csv` when that would be `input` itself.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string());
        let dir = self
            .config
            .output_dir
            .clone()
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let plain = dir.join(format!("{stem}.csv"));
        if plain == input {
            dir.join(format!("{stem}.decoded.csv"))
        } else {
            plain
        }
    }

    /// Run the converter for `input` and return the produced CSV path.
    pub fn decode(&self, input: &Path) -> Result<PathBuf, LoadError> {
        let output = self.output_path(input);
        super::ensure_parent_dir(&output)?;
        let args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect();
        debug!("decoder: {} {}", self.config.program, args.join(" "));

        let decoder_err = |reason: String| LoadError::Decoder {
            path: input.to_path_buf(),
            reason,
        };
        let result = Command::new(&self.config.program)
            .args(&args)
            .output()
            .map_err(|e| decoder_err(format!("cannot run '{}': {e}", self.config.program)))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(decoder_err(format!(
                "exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        if !output.is_file() {
            return Err(decoder_err(format!("no output at {}", output.display())));
        }
        info!("decoded {} -> {}", input.display(), output.display());
        Ok(output)
    }
}

impl SignalSource for ExternalDecoder {
    fn load(&self, path: &Path) -> Result<Signal, LoadError> {
        let csv_path = self.decode(path)?;
        self.csv.load(&csv_path)
    }
}
