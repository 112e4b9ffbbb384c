use crate::kneepoint::KneeMethod;
use crate::locator::InterventionLocator;
use serde::{Deserialize, Serialize};

/// Names of the calibration curves backing each threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationKeys {
    pub steer_angle: String,
    pub steer_rate: String,
    pub pedal_increase: String,
    pub yaw_rate: String,
    pub lat_accel: String,
}

impl Default for CalibrationKeys {
    fn default() -> Self {
        Self {
            steer_angle: "SteeringWheelAngle_Th".to_string(),
            steer_rate: "AEB_SteeringAngleRate_Override".to_string(),
            pedal_increase: "PedalPosProIncrease_Th".to_string(),
            yaw_rate: "YawrateSuspension_Th".to_string(),
            lat_accel: "LateralAcceleration_th".to_string(),
        }
    }
}

/// Levels, tolerances and windows used by the KPI computations.
///
/// - `pb_tgt_decel` / `fb_tgt_decel`: partial and full braking request levels,
///   matched within `tgt_tol`. The partial level also marks M0 (with
///   `start_tolerance`).
/// - `aeb_end_thd`: request level above which the actuation is released (M2).
/// - `time_idx_offset`: samples before M0 included in the steering, yaw and
///   lateral windows.
/// - `latency_window_samples`: samples after M0 (M1) or after the full
///   braking onset (communication latency) examined for the response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiParams {
    pub pb_tgt_decel: f64,
    pub fb_tgt_decel: f64,
    pub tgt_tol: f64,
    pub start_tolerance: f64,
    pub aeb_end_thd: f64,
    pub time_idx_offset: usize,
    pub latency_window_samples: usize,
    /// Low-pass cutoff for acceleration channels (Hz)
    pub cutoff_hz: f64,
    /// Ego speed unit conversion applied before threshold lookup
    pub speed_to_kph: f64,
    /// Jerk level marking the physical response to full braking (m/s³)
    pub aeb_jerk_neg_thd: f64,
    /// Minimum partial-braking phase before full braking (s)
    pub pb_duration_s: f64,
    pub knee_method: KneeMethod,
    pub calibration_keys: CalibrationKeys,
}

impl Default for KpiParams {
    fn default() -> Self {
        Self {
            pb_tgt_decel: -6.0,
            fb_tgt_decel: -15.0,
            tgt_tol: 0.2,
            start_tolerance: 0.1,
            aeb_end_thd: -4.9,
            time_idx_offset: 300,
            latency_window_samples: 30,
            cutoff_hz: 10.0,
            speed_to_kph: 3.6,
            aeb_jerk_neg_thd: -20.0,
            pb_duration_s: 0.32,
            knee_method: KneeMethod::Curvature,
            calibration_keys: CalibrationKeys::default(),
        }
    }
}

impl KpiParams {
    pub fn locator(&self) -> InterventionLocator {
        InterventionLocator {
            start_threshold: self.pb_tgt_decel,
            start_tolerance: self.start_tolerance,
            end_threshold: self.aeb_end_thd,
        }
    }
}
