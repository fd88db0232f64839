//! Example: Generate a four-tier TJA chart from an audio file
//!
//! Usage:
//!   cargo run --release --example generate_chart -- [--divisions N] [--bias B] [--sensitivity S] [--out DIR] <file>
//!
//! Without `--out` the merged chart is printed to stdout.

use std::env;
use std::path::{Path, PathBuf};
use tja_autochart::chart::export::{audio_asset_name, prepare_package};
use tja_autochart::io::decode_audio;
use tja_autochart::{
    analyze, derive_variants, generate_notes, merge_tiers, ChartMetadata,
    ChartOptions, ChartVariants, GlobalHeader, Tier,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut options = ChartOptions::default();
    let mut out_dir: Option<PathBuf> = None;
    let mut path: Option<String> = None;

    while !args.is_empty() {
        let a = args.remove(0);
        match a.as_str() {
            "--divisions" | "--bias" | "--sensitivity" | "--out" => {
                if args.is_empty() {
                    return Err(format!("{} requires a value", a).into());
                }
                let v = args.remove(0);
                match a.as_str() {
                    "--divisions" => options.snap_divisions = v.parse()?,
                    "--bias" => options.katsu_bias = v.parse()?,
                    "--sensitivity" => options.sensitivity = v.parse()?,
                    _ => out_dir = Some(PathBuf::from(v)),
                }
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: generate_chart [--divisions N] [--bias B] [--sensitivity S] [--out DIR] <file>\n\
                     \n\
                     --divisions N    Grid subdivisions per measure (default: 16)\n\
                     --bias B         Katsu bias in [-0.6, 0.6] (default: 0.0)\n\
                     --sensitivity S  Onset sensitivity in [0.2, 0.95] (default: 0.6)\n\
                     --out DIR        Write <title>.tja and the audio name there\n"
                );
                return Ok(());
            }
            _ => path = Some(a),
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let config = options.analysis_config();
    let decoded = decode_audio(&path, config.channel_mix)?;
    let analysis = analyze(&decoded.samples, decoded.sample_rate, &config)?;
    for warning in &analysis.warnings {
        eprintln!("warning: {}", warning);
    }

    let notes = generate_notes(&decoded.samples, decoded.sample_rate, &analysis, &options)?;

    let file_name = Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);
    let title = Path::new(&path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Chart")
        .to_string();

    let base = ChartMetadata {
        title: title.clone(),
        wave: audio_asset_name(&title, file_name.as_deref()),
        ..ChartMetadata::default()
    };
    let bpm = analysis.bpm.unwrap_or(base.bpm);

    let variants = ChartVariants::from_variants(derive_variants(
        &notes,
        bpm,
        analysis.offset_ms,
        &base,
        options.snap_divisions,
    ));

    let global = GlobalHeader {
        title: base.title.clone(),
        bpm,
        offset_ms: analysis.offset_ms,
        wave: base.wave.clone(),
        base_lines: Vec::new(),
    };
    let merged = merge_tiers(&global, &variants.sections(&Tier::Oni));

    eprintln!(
        "{}: BPM={} offset={}ms onsets={} notes={} time={:.2}ms",
        path,
        analysis
            .bpm
            .map(|b| format!("{:.1}", b))
            .unwrap_or_else(|| "none".to_string()),
        analysis.offset_ms,
        analysis.onsets.len(),
        notes.len(),
        analysis.metadata.processing_time_ms
    );

    match out_dir {
        Some(dir) => {
            let package = prepare_package(&title, &merged, file_name.as_deref());
            std::fs::create_dir_all(&dir)?;
            let chart_path = dir.join(&package.chart_file_name);
            std::fs::write(&chart_path, &package.chart_text)?;
            println!("Wrote {}", chart_path.display());
            if let Some(audio) = package.audio_file_name {
                println!("Copy the audio next to it as {}", audio);
            }
        }
        None => print!("{}", merged),
    }

    Ok(())
}
