use serde::{Serialize, Serializer};
use std::fmt;

/// One cell of a KPI record.
///
/// Non-finite floats never enter a record: they are stored as `Missing`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum KpiValue {
    Float(f64),
    Bool(bool),
    Text(String),
    #[default]
    Missing,
}

impl KpiValue {
    pub fn float(value: f64) -> Self {
        if value.is_finite() {
            KpiValue::Float(value)
        } else {
            KpiValue::Missing
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, KpiValue::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KpiValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            KpiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KpiValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// CSV cell text: floats with 3 decimals, missing as an empty cell.
    pub fn csv_cell(&self) -> String {
        match self {
            KpiValue::Float(v) => format!("{v:.3}"),
            KpiValue::Bool(b) => b.to_string(),
            KpiValue::Text(s) => s.clone(),
            KpiValue::Missing => String::new(),
        }
    }
}

impl fmt::Display for KpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiValue::Missing => f.write_str("<missing>"),
            other => f.write_str(&other.csv_cell()),
        }
    }
}

impl From<f64> for KpiValue {
    fn from(value: f64) -> Self {
        KpiValue::float(value)
    }
}

impl From<bool> for KpiValue {
    fn from(value: bool) -> Self {
        KpiValue::Bool(value)
    }
}

impl From<&str> for KpiValue {
    fn from(value: &str) -> Self {
        KpiValue::Text(value.to_string())
    }
}

impl From<String> for KpiValue {
    fn from(value: String) -> Self {
        KpiValue::Text(value)
    }
}

impl<T: Into<KpiValue>> From<Option<T>> for KpiValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(KpiValue::Missing, Into::into)
    }
}

impl Serialize for KpiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KpiValue::Float(v) => serializer.serialize_f64(*v),
            KpiValue::Bool(b) => serializer.serialize_bool(*b),
            KpiValue::Text(s) => serializer.serialize_str(s),
            KpiValue::Missing => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_floats_are_missing() {
        assert_eq!(KpiValue::from(f64::NAN), KpiValue::Missing);
        assert_eq!(KpiValue::from(f64::INFINITY), KpiValue::Missing);
        assert_eq!(KpiValue::from(Some(1.5)), KpiValue::Float(1.5));
        assert_eq!(KpiValue::from(None::<bool>), KpiValue::Missing);
    }

    #[test]
    fn csv_cells() {
        assert_eq!(KpiValue::Float(1.23456).csv_cell(), "1.235");
        assert_eq!(KpiValue::Bool(true).csv_cell(), "true");
        assert_eq!(KpiValue::Missing.csv_cell(), "");
    }

    #[test]
    fn serializes_missing_as_null() {
        let json = serde_json::to_string(&vec![KpiValue::Float(2.0), KpiValue::Missing]).unwrap();
        assert_eq!(json, "[2.0,null]");
    }
}
