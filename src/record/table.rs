use super::builder::KpiRecord;
use super::schema::KpiSchema;
use super::value::KpiValue;
use crate::error::{LoadError, SchemaError};
use crate::io::{ensure_parent_dir, write_json_file};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Append-only collection of KPI records sharing one schema.
#[derive(Clone, Debug)]
pub struct ResultTable {
    schema: Arc<KpiSchema>,
    rows: Vec<KpiRecord>,
}

impl ResultTable {
    pub fn new(schema: Arc<KpiSchema>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<KpiSchema> {
        &self.schema
    }

    pub fn rows(&self) -> &[KpiRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a record built against this table's schema.
    pub fn append(&mut self, record: KpiRecord) -> Result<(), SchemaError> {
        if !Arc::ptr_eq(record.schema(), &self.schema) && **record.schema() != *self.schema {
            return Err(SchemaError::RecordMismatch {
                expected: self.schema.len(),
                actual: record.schema().len(),
            });
        }
        self.rows.push(record);
        Ok(())
    }

    pub fn extend<I>(&mut self, records: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = KpiRecord>,
    {
        records.into_iter().try_for_each(|record| self.append(record))
    }

    /// Explicit correction of one cell after append.
    pub fn correct(
        &mut self,
        row: usize,
        name: &str,
        value: impl Into<KpiValue>,
    ) -> Result<(), SchemaError> {
        let position = self
            .schema
            .position(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))?;
        let len = self.rows.len();
        let record = self
            .rows
            .get_mut(row)
            .ok_or(SchemaError::RowOutOfRange { row, len })?;
        record.replace(position, value.into());
        Ok(())
    }

    /// Write the table as CSV with `name [unit]` headers.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.schema.display_names())?;
        for record in &self.rows {
            out.write_record(record.values().iter().map(KpiValue::csv_cell))?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), LoadError> {
        ensure_parent_dir(path)?;
        let file = std::fs::File::create(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv_to(file).map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pretty JSON array of records keyed by field name.
    pub fn write_json(&self, path: &Path) -> Result<(), LoadError> {
        write_json_file(path, &self.rows)
    }
}
