use super::ensure_parent_dir;
use crate::error::LoadError;
use crate::types::Signal;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recordings under `dir` with extension `extension` (case-insensitive),
/// sorted by path so batch order is reproducible.
pub fn find_recordings(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, LoadError> {
    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|err| LoadError::Io {
            path: dir.to_path_buf(),
            source: err.into(),
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
        if entry.file_type().is_file() && matches {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// File stem used to label the events of a recording.
pub fn recording_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write a signal (typically one event window) as CSV: time first, then
/// every channel under its canonical name.
pub fn write_window_csv(path: &Path, signal: &Signal) -> Result<(), LoadError> {
    ensure_parent_dir(path)?;
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut out = csv::Writer::from_path(path).map_err(csv_err)?;
    let channels: Vec<_> = signal.channels().collect();

    let mut header = vec!["time".to_string()];
    header.extend(channels.iter().map(|(c, _)| c.name().to_string()));
    out.write_record(&header).map_err(csv_err)?;
    for (i, t) in signal.time().iter().enumerate() {
        let row = std::iter::once(t.to_string())
            .chain(channels.iter().map(|(_, v)| v[i].to_string()));
        out.write_record(row).map_err(csv_err)?;
    }
    out.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
