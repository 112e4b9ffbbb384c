//! Collaborator boundary: recordings in, tables and audit files out.
//!
//! - [`SignalSource`]: anything that turns a recording path into a [`Signal`].
//! - [`CsvSignalSource`]: tabular recordings with a configurable column map.
//! - [`ExternalDecoder`]: runs an external converter on raw logs first.
//! - [`find_recordings`], [`write_window_csv`], [`write_json_file`]: file
//!   helpers with explicit paths.
//!
//! [`Signal`]: crate::types::Signal

mod channels;
mod csv_source;
mod decoder;
mod files;

pub use channels::ChannelMap;
pub use csv_source::CsvSignalSource;
pub use decoder::{DecoderConfig, ExternalDecoder};
pub use files::{find_recordings, recording_stem, write_window_csv};

use crate::error::LoadError;
use crate::types::Signal;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Loads one recording.
pub trait SignalSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<Signal, LoadError>;
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), LoadError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), LoadError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| LoadError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
