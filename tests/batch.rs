mod common;

use aeb_kpi::config::load_config;
use aeb_kpi::io::{find_recordings, write_window_csv, CsvSignalSource};
use aeb_kpi::kpi::fields;
use aeb_kpi::pipeline::RecordingStatus;
use aeb_kpi::{AebPipeline, Channel};
use common::synthetic_signal::{aeb_recording, BrakeRequest, RATE_HZ};
use std::fs;
use std::path::Path;

const CALIBRATION: &str = r#"{
    "AEB": {
        "Driver": {
            "PedalPosProIncrease_Th": {"breakpoints": [0, 200], "values": [0.1, 0.1]}
        },
        "Vehicle": {
            "SteeringWheelAngle_Th": {"x": [0, 200], "y": [20, 20]},
            "AEB_SteeringAngleRate_Override": {"Data": [[0, 200], [150, 150]]},
            "YawrateSuspension_Th": {"breakpoints": [0], "values": [8]},
            "LateralAcceleration_th": {"breakpoints": [0, 100], "values": [3, 3]}
        }
    }
}"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    fs::write(dir.join("calibration.json"), CALIBRATION).unwrap();
    let path = dir.join("aeb.json");
    fs::write(
        &path,
        r#"{
            "input_dir": "logs",
            "output": {"csv_out": "out/kpi.csv", "windows_dir": "out/windows"},
            "calibration": "calibration.json"
        }"#,
    )
    .unwrap();
    path
}

/// Pedal pressed to 15 % between 6 s and 7 s.
fn pedal_press(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / RATE_HZ;
            if (6.0..7.0).contains(&t) {
                15.0
            } else {
                0.0
            }
        })
        .collect()
}

fn write_recordings(logs: &Path) {
    let pressed = aeb_recording(20.0, 20.0, &[BrakeRequest::partial(5.0, 9.0)]);
    let pedal = pedal_press(pressed.len());
    let pressed = pressed.with_channel(Channel::Throttle, pedal).unwrap();
    write_window_csv(&logs.join("a_drive.csv"), &pressed).unwrap();

    let twice = aeb_recording(
        40.0,
        25.0,
        &[BrakeRequest::partial(5.0, 9.0), BrakeRequest::partial(25.0, 28.0)],
    );
    write_window_csv(&logs.join("b_drive.csv"), &twice).unwrap();

    fs::write(logs.join("c_broken.csv"), "speed,decel\n1,2\n").unwrap();
    fs::write(logs.join("notes.txt"), "not a recording").unwrap();
}

#[test]
fn batch_writes_one_row_per_event_in_recording_order() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&write_config(dir.path())).unwrap();
    write_recordings(&config.input_dir);

    let pipeline = AebPipeline::from_config(&config).unwrap();
    let paths = find_recordings(&config.input_dir, &config.recording_extension).unwrap();
    assert_eq!(paths.len(), 3, "{paths:?}");

    let source = CsvSignalSource::new(config.channels.clone());
    let report = pipeline.run_batch(&source, &paths);

    let failed: Vec<_> = report.failed().map(|s| s.label.as_str()).collect();
    assert_eq!(failed, ["c_broken"]);
    assert!(matches!(
        report.recordings[2].status,
        RecordingStatus::LoadFailed { .. }
    ));
    assert!(matches!(
        report.recordings[1].status,
        RecordingStatus::Processed {
            windows: 2,
            records: 2,
            dropped: 0
        }
    ));

    let labels: Vec<_> = report
        .table
        .rows()
        .iter()
        .map(|r| r.get(fields::LABEL).and_then(|v| v.as_str()).unwrap().to_string())
        .collect();
    assert_eq!(labels, ["a_drive_aeb_01", "b_drive_aeb_01", "b_drive_aeb_02"]);

    let rows = report.table.rows();
    assert_eq!(rows[0].flag(fields::IS_PEDAL_HIGH), Some(true));
    assert_eq!(rows[0].float(fields::PEDAL_POS_INC_TH), Some(10.0));
    assert_eq!(rows[1].flag(fields::IS_PEDAL_HIGH), Some(false));
    assert_eq!(rows[1].float(fields::STEER_ANG_TH), Some(20.0));
    assert_eq!(rows[2].float(fields::YAW_RATE_SUSP_TH), Some(8.0));

    let csv_out = config.output.csv_out.as_deref().unwrap();
    report.table.write_csv(csv_out).unwrap();
    let mut reader = csv::Reader::from_path(csv_out).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.len(), report.table.schema().len());
    assert_eq!(&header[0], "label");
    let cells: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(cells.len(), 3);
    assert_eq!(&cells[2][0], "b_drive_aeb_02");

    let windows_dir = config.output.windows_dir.as_deref().unwrap();
    for label in &labels {
        assert!(windows_dir.join(format!("{label}.csv")).is_file(), "{label}");
    }
}

#[test]
fn persisted_window_reloads_with_the_same_markers() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&write_config(dir.path())).unwrap();
    write_recordings(&config.input_dir);

    let pipeline = AebPipeline::from_config(&config).unwrap();
    let source = CsvSignalSource::new(config.channels.clone());
    let first = pipeline.run_batch(&source, &[config.input_dir.join("a_drive.csv")]);
    assert_eq!(first.table.len(), 1);

    // the persisted window is a recording of its own with one trigger
    let window = config.output.windows_dir.as_deref().unwrap().join("a_drive_aeb_01.csv");
    let again = pipeline.run_batch(&source, &[window]);
    assert_eq!(again.table.len(), 1);

    let (a, b) = (&first.table.rows()[0], &again.table.rows()[0]);
    for name in [fields::INTV_START_TIME, fields::INTV_END_TIME, fields::INTV_DUR] {
        let (x, y) = (a.float(name).unwrap(), b.float(name).unwrap());
        assert!((x - y).abs() < 1e-9, "{name}: {x} vs {y}");
    }
}
