//! Error types shared across the crate.
//!
//! Structural problems with a recording (`SignalError`) are fatal for that
//! recording. Everything below the recording level degrades locally: a
//! failing KPI sub-computation yields a `KpiError` that the engine turns into
//! missing fields.

use crate::types::Channel;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for signal-level operations
pub type SignalResult<T> = Result<T, SignalError>;

/// Result type for KPI sub-computations
pub type KpiResult<T> = Result<T, KpiError>;

/// Errors describing a structurally unusable signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// A channel does not share the length of the time base
    #[error("channel '{channel}' has {actual} samples, time base has {expected}")]
    ChannelLengthMismatch {
        channel: Channel,
        expected: usize,
        actual: usize,
    },

    /// A channel required by the requested operation is absent
    #[error("required channel '{0}' is missing")]
    MissingChannel(Channel),

    /// Time base decreases somewhere
    #[error("time base decreases at sample {0}")]
    NonMonotonicTime(usize),

    /// Signal cannot be processed (too short, degenerate sampling, ...)
    #[error("invalid signal: {0}")]
    InvalidSignal(String),
}

/// Errors raised by the knee-point detector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KneepointError {
    /// No sample satisfies the requested direction mask
    #[error("no knee point matches the requested direction")]
    NoKneepointFound,

    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// Errors raised while building or loading calibration curves.
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// Breakpoints and values disagree in length or are empty
    #[error("curve '{name}': {breakpoints} breakpoints vs {values} values")]
    ShapeMismatch {
        name: String,
        breakpoints: usize,
        values: usize,
    },

    /// Breakpoints are not strictly increasing or not finite
    #[error("curve '{name}': breakpoints must be finite and strictly increasing (index {index})")]
    UnsortedBreakpoints { name: String, index: usize },

    /// Calibration entry does not match any known layout
    #[error("curve '{name}': {reason}")]
    Malformed { name: String, reason: String },

    #[error("failed to read calibration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse calibration {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Field-level failure of a single KPI sub-computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KpiError {
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// Window does not hold enough samples around a marker
    #[error("index {index} out of range for {len} samples ({context})")]
    IndexOutOfRange {
        index: usize,
        len: usize,
        context: &'static str,
    },

    #[error(transparent)]
    Kneepoint(#[from] KneepointError),

    /// A detection step found no qualifying sample
    #[error("{0}")]
    NotDetected(&'static str),

    /// Calibration curve required for a flag was not configured
    #[error("threshold '{0}' unavailable")]
    MissingThreshold(String),
}

/// Errors raised while building schemas or appending records.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema has no variables")]
    Empty,

    #[error("duplicate schema variable '{0}'")]
    DuplicateField(String),

    #[error("record does not match table schema (expected {expected} fields, got {actual})")]
    RecordMismatch { expected: usize, actual: usize },

    #[error("field '{0}' is not part of the schema")]
    UnknownField(String),

    #[error("row {row} out of range for table with {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse schema {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of an external collaborator (decoder, file loader, exporter).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Required column absent from the recording header
    #[error("{path}: missing column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    /// Column could not be parsed as a number
    #[error("{path}: column '{column}' row {row}: cannot parse '{value}'")]
    Parse {
        path: PathBuf,
        column: String,
        row: usize,
        value: String,
    },

    /// External decoder failed or produced no output
    #[error("decoder failed for {path}: {reason}")]
    Decoder { path: PathBuf, reason: String },

    #[error("{path}: {source}")]
    Signal {
        path: PathBuf,
        #[source]
        source: SignalError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
