mod common;

use aeb_kpi::calibration::CalibrationCurve;
use aeb_kpi::kpi::{fields, CalibrationKeys};
use aeb_kpi::{AebPipeline, CalibrationSet, EventSegmenter, KpiEngine, KpiParams};
use approx::assert_abs_diff_eq;
use common::synthetic_signal::{aeb_recording, BrakeRequest};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn calibration() -> CalibrationSet {
    let keys = CalibrationKeys::default();
    let curve = |lo: f64, hi: f64| {
        CalibrationCurve::new("th", vec![0.0, 30.0, 120.0], vec![lo, lo, hi]).unwrap()
    };
    CalibrationSet::new()
        .with_curve(keys.pedal_increase, curve(5.0, 20.0))
        .with_curve(keys.steer_angle, curve(30.0, 10.0))
        .with_curve(keys.steer_rate, curve(200.0, 100.0))
        .with_curve(keys.yaw_rate, curve(10.0, 5.0))
        .with_curve(keys.lat_accel, curve(4.0, 3.0))
}

fn pipeline() -> AebPipeline {
    let engine = KpiEngine::new(
        KpiParams::default(),
        Arc::new(calibration()),
        Arc::new(fields::aeb_schema()),
    );
    AebPipeline::new(EventSegmenter::default(), engine)
}

#[test]
fn single_partial_braking_event() {
    init_logging();
    let signal = aeb_recording(20.0, 20.0, &[BrakeRequest::partial(5.0, 9.0)]);
    let pipeline = pipeline();

    let windows = pipeline.segment_events(&signal).unwrap();
    assert_eq!(windows.len(), 1, "expected exactly one event window");
    assert_abs_diff_eq!(windows[0].start_time, 1.0, epsilon = 0.02);
    assert_abs_diff_eq!(windows[0].stop_time, 12.0, epsilon = 0.02);

    let outcome = pipeline.process_recording("drive", &signal).unwrap();
    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];

    assert_eq!(record.flag(fields::IS_PEDAL_HIGH), Some(false));
    assert_eq!(record.flag(fields::VEH_STOP_CHECK), Some(false));
    assert_abs_diff_eq!(record.float(fields::INTV_DUR).unwrap(), 4.0, epsilon = 0.011);
    assert_abs_diff_eq!(record.float(fields::LOG_TIME).unwrap(), 0.99, epsilon = 0.011);
    assert_eq!(record.flag(fields::IS_PB_ON), Some(true));
    assert_eq!(record.flag(fields::IS_FB_ON), Some(false));

    let dead_time = record.float(fields::DEAD_TIME).expect("M1 found");
    assert!((0.0..=0.3).contains(&dead_time), "dead time {dead_time}");
    assert_eq!(record.flag(fields::IS_STEER_HIGH), Some(false));
    assert_abs_diff_eq!(record.float(fields::INTV_DIST).unwrap(), 65.0, epsilon = 1e-6);
}

#[test]
fn standstill_inside_window_is_flagged() {
    init_logging();
    // speed reaches 0 at the last sample, which now lies inside the window
    let signal = aeb_recording(10.0, 8.0, &[BrakeRequest::partial(5.0, 12.0)]);
    let outcome = pipeline().process_recording("stop", &signal).unwrap();
    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.flag(fields::VEH_STOP_CHECK), Some(true));
    assert_abs_diff_eq!(record.float(fields::INTV_END_TIME).unwrap(), 9.99, epsilon = 1e-9);
}

#[test]
fn escalation_and_repeat_events() {
    init_logging();
    let requests = [
        BrakeRequest::partial(5.0, 6.0),
        BrakeRequest {
            on: 6.0,
            off: 9.0,
            level: -15.0,
        },
        BrakeRequest::partial(25.0, 28.0),
    ];
    let signal = aeb_recording(40.0, 25.0, &requests);
    let outcome = pipeline().process_recording("multi", &signal).unwrap();
    assert_eq!(outcome.records.len(), 2);

    let first = &outcome.records[0];
    assert_eq!(first.flag(fields::IS_FB_ON), Some(true));
    assert_abs_diff_eq!(first.float(fields::FB_DUR).unwrap(), 2.99, epsilon = 1e-9);
    let latency = first.float(fields::COMM_LATENCY).expect("latency measured");
    assert!((0.0..=0.3).contains(&latency), "latency {latency}");

    let second = &outcome.records[1];
    assert_eq!(second.flag(fields::IS_FB_ON), Some(false));
    assert!(second.get(fields::COMM_LATENCY).unwrap().is_missing());
}
