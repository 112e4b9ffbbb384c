//! Declarative description of the KPI record layout.
//!
//! Schemas are read from `{"variables": [{feature, name, type, unit}, ...]}`
//! documents. Rows of the `Common` feature always come first, followed by the
//! rows of the selected feature, in file order.

use crate::error::SchemaError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Feature name whose variables every record carries.
pub const COMMON_FEATURE: &str = "Common";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Double,
    Logical,
    String,
}

impl FieldType {
    /// Parse a schema type tag; unknown tags fall back to `Double`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "double" | "single" | "float" => FieldType::Double,
            "logical" | "bool" | "boolean" => FieldType::Logical,
            "string" | "char" | "text" => FieldType::String,
            other => {
                warn!("schema: unknown variable type '{other}', using double");
                FieldType::Double
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldSpec {
    pub feature: String,
    pub name: String,
    pub field_type: FieldType,
    pub unit: String,
}

impl FieldSpec {
    pub fn new(feature: &str, name: &str, field_type: FieldType, unit: &str) -> Self {
        Self {
            feature: feature.to_string(),
            name: name.to_string(),
            field_type,
            unit: unit.to_string(),
        }
    }

    /// Column header: `name [unit]`, or just the name when unitless.
    pub fn display_name(&self) -> String {
        if self.unit.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} [{}]", self.name, self.unit.trim())
        }
    }
}

#[derive(Deserialize)]
struct RawSchema {
    variables: Vec<RawVariable>,
}

#[derive(Deserialize)]
struct RawVariable {
    #[serde(default)]
    feature: String,
    name: String,
    #[serde(rename = "type", default)]
    field_type: String,
    #[serde(default)]
    unit: String,
}

/// Ordered field set of a KPI record.
#[derive(Clone, Debug, PartialEq)]
pub struct KpiSchema {
    fields: Vec<FieldSpec>,
    positions: HashMap<String, usize>,
}

impl KpiSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut positions = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if positions.insert(field.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields, positions })
    }

    /// Build from names known to be unique (compile-time field lists).
    pub(crate) fn from_unique(fields: Vec<FieldSpec>) -> Self {
        let positions = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self { fields, positions }
    }

    /// Parse a schema document and keep the `Common` rows plus `feature`.
    pub fn from_json_str(json: &str, feature: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(json).map_err(|source| SchemaError::Json {
            path: "<inline>".into(),
            source,
        })?;
        Self::from_raw(raw, feature)
    }

    pub fn load(path: &Path, feature: &str) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawSchema = serde_json::from_str(&contents).map_err(|source| SchemaError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_raw(raw, feature)
    }

    fn from_raw(raw: RawSchema, feature: &str) -> Result<Self, SchemaError> {
        let to_spec = |v: &RawVariable| {
            FieldSpec::new(&v.feature, &v.name, FieldType::parse(&v.field_type), &v.unit)
        };
        let common = raw
            .variables
            .iter()
            .filter(|v| v.feature.eq_ignore_ascii_case(COMMON_FEATURE))
            .map(to_spec);
        let selected = raw
            .variables
            .iter()
            .filter(|v| v.feature.eq_ignore_ascii_case(feature))
            .filter(|v| !feature.eq_ignore_ascii_case(COMMON_FEATURE))
            .map(to_spec);
        Self::new(common.chain(selected).collect())
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.position(name).map(|i| &self.fields[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn display_names(&self) -> Vec<String> {
        self.fields.iter().map(FieldSpec::display_name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "variables": [
            {"feature": "AEB", "name": "intvDur", "type": "double", "unit": "s"},
            {"feature": "Common", "name": "label", "type": "string", "unit": ""},
            {"feature": "FCW", "name": "ttc", "type": "double", "unit": "s"},
            {"feature": "AEB", "name": "isPBOn", "type": "logical", "unit": ""},
            {"feature": "AEB", "name": "odd", "type": "int64", "unit": "-"}
        ]
    }"#;

    #[test]
    fn common_rows_come_first_and_other_features_are_dropped() {
        let schema = KpiSchema::from_json_str(DOC, "AEB").unwrap();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["label", "intvDur", "isPBOn", "odd"]);
        assert_eq!(schema.field("isPBOn").unwrap().field_type, FieldType::Logical);
        assert_eq!(schema.field("odd").unwrap().field_type, FieldType::Double);
        assert_eq!(schema.field("intvDur").unwrap().display_name(), "intvDur [s]");
        assert_eq!(schema.field("label").unwrap().display_name(), "label");
    }

    #[test]
    fn duplicates_and_empty_schemas_are_rejected() {
        let dup = vec![
            FieldSpec::new("AEB", "a", FieldType::Double, ""),
            FieldSpec::new("AEB", "a", FieldType::Logical, ""),
        ];
        assert!(matches!(KpiSchema::new(dup), Err(SchemaError::DuplicateField(name)) if name == "a"));
        assert!(matches!(KpiSchema::from_json_str(DOC, "NONE"), Ok(s) if s.len() == 1));
        assert!(matches!(KpiSchema::new(Vec::new()), Err(SchemaError::Empty)));
    }
}
