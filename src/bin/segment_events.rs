use aeb_kpi::config::load_config;
use aeb_kpi::io::{recording_stem, CsvSignalSource, ExternalDecoder, SignalSource};
use aeb_kpi::pipeline::event_label;
use aeb_kpi::segmenter::{EventCandidates, EventSegmenter};
use aeb_kpi::EventWindow;
use serde::Serialize;
use std::env;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LabelledWindow<'a> {
    label: String,
    #[serde(flatten)]
    window: &'a EventWindow,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SegmentationDump<'a> {
    recording: String,
    candidates: EventCandidates,
    windows: Vec<LabelledWindow<'a>>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args();
    let program = args
        .next()
        .unwrap_or_else(|| "segment_events".to_string());
    let usage = || format!("Usage: {program} <config.json> <recording>");
    let config_path = args.next().ok_or_else(usage)?;
    let recording = args.next().ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let csv = CsvSignalSource::new(config.channels.clone());
    let path = Path::new(&recording);
    let signal = match &config.decoder {
        Some(decoder) => ExternalDecoder::new(decoder.clone(), csv).load(path),
        None => csv.load(path),
    }
    .map_err(|e| e.to_string())?;

    let segmenter = EventSegmenter::new(config.segmenter);
    let candidates = segmenter.candidates(&signal).map_err(|e| e.to_string())?;
    let windows = segmenter.segment(&signal).map_err(|e| e.to_string())?;

    let stem = recording_stem(path);
    let dump = SegmentationDump {
        recording,
        candidates,
        windows: windows
            .iter()
            .map(|window| LabelledWindow {
                label: event_label(&stem, window.ordinal),
                window,
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&dump)
        .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
    println!("{json}");
    Ok(())
}
