//! JSON calibration tables.
//!
//! Accepted leaf layouts, keyed by curve name:
//! - `{"breakpoints": [...], "values": [...]}`
//! - `{"x": [...], "y": [...]}`
//! - `{"Data": [[breakpoints...], [values...]]}` (two-row table)
//!
//! Leaves may sit at the top level or inside one or more grouping objects
//! (e.g. `{"steering": {"SteeringWheelAngle_Th": {...}}}`); groups are
//! flattened and only the leaf name is kept. Malformed leaves are skipped with
//! a warning so one broken table does not block the remaining thresholds.

use super::{CalibrationCurve, CalibrationSet};
use crate::error::CalibrationError;
use log::warn;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Read and parse a calibration file.
pub fn load_calibration(path: &Path) -> Result<CalibrationSet, CalibrationError> {
    let data = fs::read_to_string(path).map_err(|source| CalibrationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&data).map_err(|source| CalibrationError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_calibration(&value))
}

/// Flatten a parsed calibration document into a [`CalibrationSet`].
pub fn parse_calibration(root: &Value) -> CalibrationSet {
    let mut set = CalibrationSet::new();
    if let Value::Object(map) = root {
        collect(map, &mut set);
    } else {
        warn!("calibration: top level is not an object, no curves loaded");
    }
    set
}

fn collect(map: &Map<String, Value>, set: &mut CalibrationSet) {
    for (name, entry) in map {
        let Value::Object(obj) = entry else {
            warn!("calibration: skipping '{name}': not an object");
            continue;
        };
        if is_leaf(obj) {
            match parse_leaf(name, obj) {
                Ok(curve) => set.insert(name.clone(), curve),
                Err(err) => warn!("calibration: skipping {err}"),
            }
        } else {
            collect(obj, set);
        }
    }
}

fn is_leaf(obj: &Map<String, Value>) -> bool {
    obj.contains_key("Data")
        || (obj.contains_key("breakpoints") && obj.contains_key("values"))
        || (obj.contains_key("x") && obj.contains_key("y"))
}

fn parse_leaf(name: &str, obj: &Map<String, Value>) -> Result<CalibrationCurve, CalibrationError> {
    let (xs, ys) = if let Some(data) = obj.get("Data") {
        let rows = data.as_array().ok_or_else(|| malformed(name, "'Data' is not an array"))?;
        if rows.len() != 2 {
            return Err(malformed(
                name,
                &format!("'Data' must have 2 rows, found {}", rows.len()),
            ));
        }
        (numbers(name, &rows[0])?, numbers(name, &rows[1])?)
    } else if let (Some(b), Some(v)) = (obj.get("breakpoints"), obj.get("values")) {
        (numbers(name, b)?, numbers(name, v)?)
    } else if let (Some(x), Some(y)) = (obj.get("x"), obj.get("y")) {
        (numbers(name, x)?, numbers(name, y)?)
    } else {
        return Err(malformed(name, "no curve data"));
    };
    CalibrationCurve::new(name, xs, ys)
}

fn numbers(name: &str, value: &Value) -> Result<Vec<f64>, CalibrationError> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed(name, "expected an array of numbers"))?;
    items
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| malformed(name, &format!("non-numeric entry {v}")))
        })
        .collect()
}

fn malformed(name: &str, reason: &str) -> CalibrationError {
    CalibrationError::Malformed {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_grouped_and_flat_layouts() {
        let doc = json!({
            "steering": {
                "SteeringWheelAngle_Th": {"Data": [[0, 50, 100], [90, 45, 20]]},
                "AEB_SteeringAngleRate_Override": {"x": [0, 100], "y": [400, 200]}
            },
            "YawrateSuspension_Th": {"breakpoints": [0, 120], "values": [10, 5]}
        });
        let set = parse_calibration(&doc);
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("SteeringWheelAngle_Th").unwrap().values(), &[90.0, 45.0, 20.0]);
        assert_eq!(set.threshold("YawrateSuspension_Th", 60.0), Some(7.5));
    }

    #[test]
    fn malformed_leaves_are_skipped() {
        let doc = json!({
            "broken": {"Data": [[0, 1, 2]]},
            "nulls": {"x": [0, null], "y": [1, 2]},
            "unsorted": {"x": [5, 1], "y": [1, 2]},
            "ok": {"x": [0], "y": [3]}
        });
        let set = parse_calibration(&doc);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal.json");
        std::fs::write(&path, r#"{"LateralAcceleration_th": {"x": [0, 100], "y": [3, 5]}}"#).unwrap();
        let set = load_calibration(&path).unwrap();
        assert_eq!(set.threshold("LateralAcceleration_th", 50.0), Some(4.0));

        let missing = load_calibration(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(CalibrationError::Io { .. })));
    }
}
