//! Schema-driven KPI records and the result table they are collected in.
//!
//! - [`KpiSchema`]: ordered `(name, type, unit)` descriptors loaded once.
//! - [`KpiFields`] / [`KpiRecord`]: write-once builder and the finished row.
//! - [`ResultTable`]: append-only sink with CSV and JSON export.

mod builder;
mod schema;
mod table;
mod value;

pub use builder::{KpiFields, KpiRecord};
pub use schema::{FieldSpec, FieldType, KpiSchema, COMMON_FEATURE};
pub use table::ResultTable;
pub use value::KpiValue;
