use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use crossbeam::channel;
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::json;
use stride_tracker_rs::export::{create_gpx_track, TrackExport, TrackRecorder};
use stride_tracker_rs::{FusionConfig, FusionEngine, FusionEvent, FusionWorker, SensorEvent};

#[derive(Parser, Debug)]
#[command(name = "stride_replay")]
#[command(about = "Replay recorded step / GPS / compass logs through the fusion engine", long_about = None)]
struct Args {
    /// Path to a session_*.json[.gz] event log
    #[arg(long, conflicts_with = "log_dir")]
    log: Option<PathBuf>,

    /// Directory of logs to batch replay (processes session_*.json[.gz])
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// JSON engine configuration; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial step length override in meters
    #[arg(long)]
    step_length: Option<f64>,

    /// Write the displayed track as GPX (single log only)
    #[arg(long, requires = "log")]
    gpx: Option<PathBuf>,

    /// Write the displayed track and final state as JSON (single log only)
    #[arg(long, requires = "log")]
    track_json: Option<PathBuf>,
}

#[derive(Deserialize)]
struct LogFile {
    #[serde(default)]
    name: Option<String>,
    events: Vec<SensorEvent>,
}

fn load_log(path: &Path) -> anyhow::Result<LogFile> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let gz = GzDecoder::new(file);
        let reader = BufReader::new(gz);
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn load_config(args: &Args) -> anyhow::Result<FusionConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => FusionConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FusionConfig::default(),
    };
    if let Some(step_length) = args.step_length {
        config.step_length_m = step_length;
        config.validate()?;
    }
    Ok(config)
}

fn run_once(path: &Path, args: &Args) -> anyhow::Result<serde_json::Value> {
    let session = load_log(path).with_context(|| format!("reading {}", path.display()))?;
    let engine = FusionEngine::new(load_config(args)?)?;

    let (event_tx, event_rx) = channel::unbounded();
    let worker = FusionWorker::spawn(engine, TrackRecorder::new(), Some(event_tx))?;
    let handle = worker.handle();
    for event in session.events {
        handle.submit(event)?;
    }
    let report = worker.shutdown()?;

    let mut committed = 0u64;
    let mut ignored = 0u64;
    let mut resets = 0u64;
    let mut abandoned = 0u64;
    let mut converged_at: Option<f64> = None;
    for event in event_rx.iter() {
        match event {
            FusionEvent::RecordCommitted { reset, .. } => {
                committed += 1;
                if reset {
                    resets += 1;
                }
            }
            FusionEvent::StepIgnored { .. } => ignored += 1,
            FusionEvent::CalibrationAbandoned { .. } => abandoned += 1,
            FusionEvent::CalibrationConverged { step_length_m, .. } => converged_at = Some(step_length_m),
            _ => {}
        }
    }

    let snapshot = report.engine.snapshot();
    let name = session
        .name
        .unwrap_or_else(|| path.file_stem().and_then(|s| s.to_str()).unwrap_or("session").to_string());
    let points = report.sink.into_points();
    log::info!("{}: {} steps committed, {} positions displayed", name, committed, points.len());

    if let Some(gpx_path) = args.gpx.as_ref() {
        let track = create_gpx_track(&name, Utc::now(), &points);
        fs::write(gpx_path, track.to_gpx_xml())?;
        log::info!("wrote GPX track to {}", gpx_path.display());
    }

    let result = json!({
        "log": path.display().to_string(),
        "events": report.events_processed,
        "steps_committed": committed,
        "steps_ignored": ignored,
        "resets": resets,
        "calibration_abandoned": abandoned,
        "calibrated_step_length": converged_at,
        "final": &snapshot,
    });

    if let Some(json_path) = args.track_json.as_ref() {
        let export = TrackExport::new(&name, snapshot, points);
        fs::write(json_path, export.to_json()?)?;
        log::info!("wrote track export to {}", json_path.display());
    }

    Ok(result)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut results = Vec::new();

    if let Some(dir) = args.log_dir.as_ref() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !(name.starts_with("session_") && (name.ends_with(".json") || name.ends_with(".json.gz"))) {
                continue;
            }
            match run_once(&path, &args) {
                Ok(res) => results.push(res),
                Err(e) => log::error!("Failed {}: {:#}", path.display(), e),
            }
        }
    } else if let Some(path) = args.log.as_ref() {
        results.push(run_once(path, &args)?);
    } else {
        anyhow::bail!("Provide --log or --log-dir");
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
