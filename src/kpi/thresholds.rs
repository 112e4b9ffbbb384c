use super::fields;
use super::options::CalibrationKeys;
use crate::calibration::CalibrationSet;
use crate::record::KpiFields;
use log::warn;

/// Speed-interpolated thresholds for one event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thresholds {
    pub steer_angle: Option<f64>,
    pub steer_rate: Option<f64>,
    pub pedal_increase: Option<f64>,
    pub yaw_rate: Option<f64>,
    pub lat_accel: Option<f64>,
}

impl Thresholds {
    /// Interpolate every configured curve at `speed_kph`.
    pub fn resolve(calibration: &CalibrationSet, keys: &CalibrationKeys, speed_kph: f64) -> Self {
        let lookup = |key: &str| {
            let value = calibration
                .threshold(key, speed_kph)
                .filter(|v| v.is_finite());
            if value.is_none() {
                warn!("kpi: threshold '{key}' unavailable at {speed_kph:.1} kph");
            }
            value
        };
        Self {
            steer_angle: lookup(&keys.steer_angle),
            steer_rate: lookup(&keys.steer_rate),
            pedal_increase: lookup(&keys.pedal_increase),
            yaw_rate: lookup(&keys.yaw_rate),
            lat_accel: lookup(&keys.lat_accel),
        }
    }

    pub(crate) fn write(&self, out: &mut KpiFields) {
        out.set(fields::STEER_ANG_TH, self.steer_angle);
        out.set(fields::STEER_ANG_RATE_TH, self.steer_rate);
        out.set(fields::PEDAL_POS_INC_TH, self.pedal_increase);
        out.set(fields::YAW_RATE_SUSP_TH, self.yaw_rate);
        out.set(fields::LAT_ACCEL_TH, self.lat_accel);
    }
}

/// `Some(value > threshold)`, or `None` without a threshold.
pub fn exceeds(value: f64, threshold: Option<f64>) -> Option<bool> {
    threshold.map(|th| value > th)
}
