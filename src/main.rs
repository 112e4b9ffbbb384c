use aeb_kpi::config::load_config;
use aeb_kpi::io::{find_recordings, write_json_file, CsvSignalSource, ExternalDecoder, SignalSource};
use aeb_kpi::pipeline::{AebPipeline, RecordingStatus};
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage(program: &str) -> String {
    format!("Usage: {program} <config.json>")
}

fn run() -> Result<(), String> {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "aeb_kpi".to_string());
    let config_path = args.next().ok_or_else(|| usage(&program))?;
    let config = load_config(Path::new(&config_path))?;

    let pipeline = AebPipeline::from_config(&config).map_err(|e| e.to_string())?;
    let csv = CsvSignalSource::new(config.channels.clone());
    let source: Box<dyn SignalSource> = match &config.decoder {
        Some(decoder) => Box::new(ExternalDecoder::new(decoder.clone(), csv)),
        None => Box::new(csv),
    };

    let recordings = find_recordings(&config.input_dir, &config.recording_extension)
        .map_err(|e| e.to_string())?;
    if recordings.is_empty() {
        return Err(format!(
            "No .{} recordings under {}",
            config.recording_extension,
            config.input_dir.display()
        ));
    }

    let report = pipeline.run_batch(source.as_ref(), &recordings);
    for summary in &report.recordings {
        match &summary.status {
            RecordingStatus::Processed {
                windows,
                records,
                dropped,
            } => println!(
                "{:<40} windows={windows:<3} records={records:<3} dropped={dropped}",
                summary.label
            ),
            RecordingStatus::LoadFailed { reason } | RecordingStatus::SignalFailed { reason } => {
                println!("{:<40} FAILED: {reason}", summary.label)
            }
        }
    }
    println!(
        "{} records from {} recordings in {:.1} ms",
        report.table.len(),
        report.recordings.len(),
        report.timing.total_ms
    );

    if let Some(path) = &config.output.csv_out {
        report.table.write_csv(path).map_err(|e| e.to_string())?;
        println!("KPI table written to {}", path.display());
    }
    if let Some(path) = &config.output.json_out {
        report.table.write_json(path).map_err(|e| e.to_string())?;
        let runs = path.with_extension("runs.json");
        write_json_file(&runs, &report.recordings).map_err(|e| e.to_string())?;
        println!("JSON written to {} and {}", path.display(), runs.display());
    }
    Ok(())
}
