//! Field names written by the KPI engine and the built-in AEB schema.

use crate::record::{FieldSpec, FieldType, KpiSchema, COMMON_FEATURE};

pub const LABEL: &str = "label";
pub const LOG_TIME: &str = "logTime";
pub const VEH_SPD: &str = "vehSpd";
pub const INTV_START_TIME: &str = "aebIntvStartTime";
pub const SYS_RESP_TIME: &str = "m1IntvSysResp";
pub const INTV_END_TIME: &str = "aebIntvEndTime";
pub const INTV_DUR: &str = "intvDur";
pub const DEAD_TIME: &str = "m1DeadTime";
pub const VEH_STOP_CHECK: &str = "vehStopCheck";

pub const IS_PB_ON: &str = "isPBOn";
pub const IS_FB_ON: &str = "isFBOn";
pub const PB_DUR: &str = "pbDur";
pub const FB_DUR: &str = "fbDur";
pub const COMM_LATENCY: &str = "commLatency";

pub const PEDAL_POS_AT_START: &str = "pedalPosAtStart";
pub const PEDAL_POS_MAX: &str = "pedalPosMax";
pub const PEDAL_POS_INC: &str = "pedalPosInc";
pub const IS_PEDAL_HIGH: &str = "isPedalHigh";
pub const IS_PEDAL_ON_AT_START: &str = "isPedalOnAtStrt";

pub const ABS_STEER_MAX: &str = "absSteerMaxDeg";
pub const IS_STEER_HIGH: &str = "isSteerHigh";
pub const ABS_STEER_RATE_MAX: &str = "absSteerRateMaxDeg";
pub const IS_STEER_RATE_HIGH: &str = "isSteerAngRateHigh";
pub const ABS_LAT_ACCEL_MAX: &str = "absLatAccelMax";
pub const IS_LAT_ACCEL_HIGH: &str = "isLatAccelHigh";
pub const ABS_YAW_RATE_MAX: &str = "absYawRateMaxDeg";
pub const IS_YAW_RATE_HIGH: &str = "isYawRateHigh";

pub const FIRST_DET_DIST: &str = "firstDetDist";
pub const STABLE_DET_DIST: &str = "stableDetDist";
pub const INTV_DIST: &str = "aebIntvDist";
pub const STOP_GAP: &str = "aebStopGap";

pub const STEER_ANG_TH: &str = "steerAngTh";
pub const STEER_ANG_RATE_TH: &str = "steerAngRateTh";
pub const PEDAL_POS_INC_TH: &str = "pedalPosIncTh";
pub const YAW_RATE_SUSP_TH: &str = "yawRateSuspTh";
pub const LAT_ACCEL_TH: &str = "latAccelTh";

/// Feature name of the AEB rows in a schema document.
pub const AEB_FEATURE: &str = "AEB";

const AEB_FIELDS: &[(&str, FieldType, &str)] = &[
    (VEH_SPD, FieldType::Double, "kph"),
    (INTV_START_TIME, FieldType::Double, "s"),
    (SYS_RESP_TIME, FieldType::Double, "s"),
    (INTV_END_TIME, FieldType::Double, "s"),
    (INTV_DUR, FieldType::Double, "s"),
    (DEAD_TIME, FieldType::Double, "s"),
    (IS_PB_ON, FieldType::Logical, ""),
    (IS_FB_ON, FieldType::Logical, ""),
    (PB_DUR, FieldType::Double, "s"),
    (FB_DUR, FieldType::Double, "s"),
    (PEDAL_POS_AT_START, FieldType::Double, "%"),
    (PEDAL_POS_MAX, FieldType::Double, "%"),
    (PEDAL_POS_INC, FieldType::Double, "%"),
    (IS_PEDAL_HIGH, FieldType::Logical, ""),
    (IS_PEDAL_ON_AT_START, FieldType::Logical, ""),
    (ABS_STEER_MAX, FieldType::Double, "deg"),
    (IS_STEER_HIGH, FieldType::Logical, ""),
    (ABS_STEER_RATE_MAX, FieldType::Double, "deg/s"),
    (IS_STEER_RATE_HIGH, FieldType::Logical, ""),
    (ABS_LAT_ACCEL_MAX, FieldType::Double, "m/s^2"),
    (IS_LAT_ACCEL_HIGH, FieldType::Logical, ""),
    (ABS_YAW_RATE_MAX, FieldType::Double, "deg/s"),
    (IS_YAW_RATE_HIGH, FieldType::Logical, ""),
    (FIRST_DET_DIST, FieldType::Double, "m"),
    (STABLE_DET_DIST, FieldType::Double, "m"),
    (INTV_DIST, FieldType::Double, "m"),
    (STOP_GAP, FieldType::Double, "m"),
    (VEH_STOP_CHECK, FieldType::Logical, ""),
    (COMM_LATENCY, FieldType::Double, "s"),
    (STEER_ANG_TH, FieldType::Double, "deg"),
    (STEER_ANG_RATE_TH, FieldType::Double, "deg/s"),
    (PEDAL_POS_INC_TH, FieldType::Double, "%"),
    (YAW_RATE_SUSP_TH, FieldType::Double, "deg/s"),
    (LAT_ACCEL_TH, FieldType::Double, "m/s^2"),
];

/// Schema used when no schema document is configured.
pub fn aeb_schema() -> KpiSchema {
    let common = [
        FieldSpec::new(COMMON_FEATURE, LABEL, FieldType::String, ""),
        FieldSpec::new(COMMON_FEATURE, LOG_TIME, FieldType::Double, "s"),
    ];
    let aeb = AEB_FIELDS
        .iter()
        .map(|&(name, field_type, unit)| FieldSpec::new(AEB_FEATURE, name, field_type, unit));
    KpiSchema::from_unique(common.into_iter().chain(aeb).collect())
}
