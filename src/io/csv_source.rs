use super::{ChannelMap, SignalSource};
use crate::error::LoadError;
use crate::types::{Channel, Signal};
use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads recordings stored as CSV with one column per channel.
///
/// The time column is required. Channels whose column is absent are left out
/// of the signal; whether that is fatal is decided by the consumer. Empty
/// cells load as NaN.
#[derive(Clone, Debug, Default)]
pub struct CsvSignalSource {
    channels: ChannelMap,
}

impl CsvSignalSource {
    pub fn new(channels: ChannelMap) -> Self {
        Self { channels }
    }

    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// Parse CSV from `reader`; `path` only labels errors.
    pub fn read<R: Read>(&self, reader: R, path: &Path) -> Result<Signal, LoadError> {
        let csv_err = |source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers().map_err(csv_err)?.clone();
        let find = |name: &str| headers.iter().position(|h| h == name);

        let time_col = find(&self.channels.time).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: self.channels.time.clone(),
        })?;
        let columns: Vec<(Channel, usize)> = Channel::ALL
            .iter()
            .filter_map(|&channel| match find(self.channels.column(channel)) {
                Some(col) => Some((channel, col)),
                None => {
                    debug!("{}: no column for {channel}", path.display());
                    None
                }
            })
            .collect();

        let mut time = Vec::new();
        let mut samples: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_err)?;
            let cell = |col: usize, name: &str| parse_cell(record.get(col).unwrap_or(""), path, name, row);
            time.push(cell(time_col, &self.channels.time)?);
            for (out, &(channel, col)) in samples.iter_mut().zip(&columns) {
                out.push(cell(col, self.channels.column(channel))?);
            }
        }

        let channels: BTreeMap<Channel, Vec<f64>> = columns
            .iter()
            .map(|&(channel, _)| channel)
            .zip(samples)
            .collect();
        Signal::new(time, channels).map_err(|source| LoadError::Signal {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn parse_cell(text: &str, path: &Path, column: &str, row: usize) -> Result<f64, LoadError> {
    if text.is_empty() {
        return Ok(f64::NAN);
    }
    text.parse::<f64>().map_err(|_| LoadError::Parse {
        path: path.to_path_buf(),
        column: column.to_string(),
        row,
        value: text.to_string(),
    })
}

impl SignalSource for CsvSignalSource {
    fn load(&self, path: &Path) -> Result<Signal, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read(file, path)
    }
}
