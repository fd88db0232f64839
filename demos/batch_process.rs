//! Example: Analyze multiple audio files in parallel
//!
//! Usage:
//!   cargo run --release --example batch_process -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Parallelism is across files; each analysis is single-threaded.

use rayon::prelude::*;
use serde::Serialize;
use std::env;
use std::time::Instant;
use tja_autochart::io::decode_audio;
use tja_autochart::{analyze, generate_notes, AnalysisConfig, ChartOptions};

#[derive(Debug, Serialize)]
struct ItemOut {
    file: String,
    bpm: Option<f64>,
    offset_ms: f64,
    onsets: usize,
    notes: usize,
    processing_time_ms: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ItemOut {
    fn failed(file: String, error: String) -> Self {
        Self {
            file,
            bpm: None,
            offset_ms: 0.0,
            onsets: 0,
            notes: 0,
            processing_time_ms: 0.0,
            error: Some(error),
        }
    }
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn process(path: &str, config: &AnalysisConfig, options: &ChartOptions) -> ItemOut {
    let decoded = match decode_audio(path, config.channel_mix) {
        Ok(decoded) => decoded,
        Err(e) => return ItemOut::failed(path.to_string(), format!("decode failed: {e}")),
    };

    let analysis = match analyze(&decoded.samples, decoded.sample_rate, config) {
        Ok(analysis) => analysis,
        Err(e) => return ItemOut::failed(path.to_string(), format!("analysis failed: {e}")),
    };

    match generate_notes(&decoded.samples, decoded.sample_rate, &analysis, options) {
        Ok(notes) => ItemOut {
            file: path.to_string(),
            bpm: analysis.bpm,
            offset_ms: analysis.offset_ms,
            onsets: analysis.onsets.len(),
            notes: notes.len(),
            processing_time_ms: analysis.metadata.processing_time_ms,
            error: None,
        },
        Err(e) => ItemOut::failed(path.to_string(), format!("note generation failed: {e}")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while !args.is_empty() {
        let a = args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args.first().ok_or("--jobs requires a value")?.parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: batch_process [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let options = ChartOptions::default();
    let config = options.analysis_config();

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<ItemOut> =
        pool.install(|| paths.par_iter().map(|p| process(p, &config, &options)).collect());

    for (idx, o) in outs.iter().enumerate() {
        if json {
            println!("{}", serde_json::to_string(o)?);
            continue;
        }
        match &o.error {
            None => println!(
                "[{}/{}] {}: BPM={} offset={}ms onsets={} notes={} time={:.2}ms",
                idx + 1,
                outs.len(),
                o.file,
                o.bpm
                    .map(|b| format!("{:.1}", b))
                    .unwrap_or_else(|| "none".to_string()),
                o.offset_ms,
                o.onsets,
                o.notes,
                o.processing_time_ms
            ),
            Some(e) => println!("[{}/{}] {}: ERROR: {}", idx + 1, outs.len(), o.file, e),
        }
    }

    let ok = outs.iter().filter(|o| o.error.is_none()).count();
    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok,
        outs.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}
