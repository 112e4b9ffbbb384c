use super::schema::{FieldType, KpiSchema};
use super::value::KpiValue;
use log::{debug, warn};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Write-once builder for one KPI record.
///
/// Values are coerced to the declared field type. Names the schema does not
/// declare are dropped, so one KPI engine can feed differently configured
/// tables. A field can only be written once; fields never written end up
/// `Missing`.
#[derive(Clone, Debug)]
pub struct KpiFields {
    schema: Arc<KpiSchema>,
    values: Vec<KpiValue>,
    written: Vec<bool>,
}

impl KpiFields {
    pub fn new(schema: Arc<KpiSchema>) -> Self {
        let n = schema.len();
        Self {
            schema,
            values: vec![KpiValue::Missing; n],
            written: vec![false; n],
        }
    }

    /// Set `name`; returns whether the value was stored.
    pub fn set(&mut self, name: &str, value: impl Into<KpiValue>) -> bool {
        let Some(i) = self.schema.position(name) else {
            debug!("record: '{name}' not in schema, dropped");
            return false;
        };
        if self.written[i] {
            warn!("record: '{name}' already written, keeping first value");
            return false;
        }
        let field_type = self.schema.fields()[i].field_type;
        self.values[i] = coerce(value.into(), field_type);
        self.written[i] = true;
        true
    }

    /// Mark `name` as explicitly missing.
    pub fn missing(&mut self, name: &str) -> bool {
        self.set(name, KpiValue::Missing)
    }

    pub fn get(&self, name: &str) -> Option<&KpiValue> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    pub fn build(self) -> KpiRecord {
        KpiRecord {
            schema: self.schema,
            values: self.values,
        }
    }
}

fn coerce(value: KpiValue, field_type: FieldType) -> KpiValue {
    match (field_type, value) {
        (_, KpiValue::Missing) => KpiValue::Missing,
        (FieldType::Double, KpiValue::Bool(b)) => KpiValue::Float(if b { 1.0 } else { 0.0 }),
        (FieldType::Double, KpiValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_or(KpiValue::Missing, KpiValue::float),
        (FieldType::Logical, KpiValue::Float(v)) => KpiValue::Bool(v != 0.0),
        (FieldType::Logical, KpiValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => KpiValue::Bool(true),
            "false" | "0" => KpiValue::Bool(false),
            _ => KpiValue::Missing,
        },
        (FieldType::String, KpiValue::Float(v)) => KpiValue::Text(format!("{v}")),
        (FieldType::String, KpiValue::Bool(b)) => KpiValue::Text(b.to_string()),
        (_, value) => value,
    }
}

/// One row of the result table, shaped by its schema.
#[derive(Clone, Debug, PartialEq)]
pub struct KpiRecord {
    schema: Arc<KpiSchema>,
    values: Vec<KpiValue>,
}

impl KpiRecord {
    pub fn builder(schema: Arc<KpiSchema>) -> KpiFields {
        KpiFields::new(schema)
    }

    pub fn schema(&self) -> &Arc<KpiSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[KpiValue] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&KpiValue> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(KpiValue::as_f64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(KpiValue::as_bool)
    }

    /// `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KpiValue)> {
        self.schema.names().zip(self.values.iter())
    }

    pub(crate) fn replace(&mut self, position: usize, value: KpiValue) {
        let field_type = self.schema.fields()[position].field_type;
        self.values[position] = coerce(value, field_type);
    }
}

impl Serialize for KpiRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
