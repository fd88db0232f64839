//! # TJA Autochart
//!
//! Turns a decoded audio track into a playable taiko chart: tempo and offset
//! estimation, don/katsu classification with accents, grid quantization, and
//! the TJA text format (parse, edit, render, multi-tier merge).
//!
//! ## Quick Start
//!
//! ```no_run
//! use tja_autochart::{analyze, derive_variants, generate_notes};
//! use tja_autochart::{AnalysisConfig, ChartMetadata, ChartOptions};
//!
//! // Mono samples, normalized to [-1.0, 1.0]
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 44100;
//!
//! let analysis = analyze(&samples, sample_rate, &AnalysisConfig::default())?;
//! let options = ChartOptions::default();
//! let notes = generate_notes(&samples, sample_rate, &analysis, &options)?;
//!
//! let base = ChartMetadata::default();
//! let bpm = analysis.bpm.unwrap_or(base.bpm);
//! for variant in derive_variants(&notes, bpm, analysis.offset_ms, &base, options.snap_divisions) {
//!     println!("{}\n{}", variant.tier, variant.document);
//! }
//! # Ok::<(), tja_autochart::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! samples → envelope → onsets → tempo/offset → classify/snap → notes
//!                                                               ↓
//!                              TJA text ← render / merge ← difficulty variants
//! ```
//!
//! Every stage is a pure function over borrowed input; nothing is retained
//! between calls. Chart text never fails to parse: problems are reported as
//! line-tagged [`Diagnostic`]s.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod chart;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::result::{AnalysisMetadata, AudioAnalysis};
pub use chart::difficulty::{derive_variants, ChartVariants, DifficultyVariant, Tier, TierState};
pub use chart::document::{render_document, set_header};
pub use chart::merge::{merge_tiers, GlobalHeader, TierSection};
pub use chart::note::{NoteEvent, NoteKind};
pub use chart::parser::{parse_document, ParsedChart};
pub use chart::{ChartMetadata, Diagnostic};
pub use config::{AnalysisConfig, ChartOptions};
pub use error::AnalysisError;

use features::classify::{classify_onsets, transient::TRANSIENT_WINDOW_SIZE};
use features::envelope::compute_energy_envelope;
use features::onset::detect_onsets;
use features::period::{estimate_offset_ms, estimate_tempo_with_votes};
use io::SampleBuffer;

/// Version string recorded in [`AnalysisMetadata`]
pub const ALGORITHM_VERSION: &str = env!("CARGO_PKG_VERSION");

fn check_samples(samples: &[f32], sample_rate: u32) -> Result<(), AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
    }
    if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
        return Err(AnalysisError::NumericalError(format!(
            "Non-finite sample at index {}",
            idx
        )));
    }
    Ok(())
}

/// Main analysis function
///
/// Estimates tempo and grid offset and returns the onsets they were derived
/// from.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (typically 44100 or 48000)
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AudioAnalysis`; silent or arrhythmic audio yields `bpm: None`,
/// `offset_ms: 0` and a warning rather than an error
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or an invalid
/// config, and `AnalysisError::NumericalError` for NaN/infinite samples
///
/// # Example
///
/// ```
/// use tja_autochart::{analyze, AnalysisConfig};
///
/// let samples = vec![0.0f32; 44100]; // 1 second of silence
/// let analysis = analyze(&samples, 44100, &AnalysisConfig::default())?;
/// assert_eq!(analysis.bpm, None);
/// assert_eq!(analysis.offset_ms, 0.0);
/// assert!(analysis.onsets.is_empty());
/// # Ok::<(), tja_autochart::AnalysisError>(())
/// ```
pub fn analyze(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<AudioAnalysis, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!(
        "Starting audio analysis: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    config.validate()?;
    check_samples(samples, sample_rate)?;

    let buffer = SampleBuffer::new(samples, sample_rate);
    let mut warnings = Vec::new();

    // Stage 1: framing
    let envelope = compute_energy_envelope(samples, config.window_size, config.hop_size);
    if samples.len() < config.window_size {
        log::warn!(
            "Input ({} samples) is shorter than one window ({})",
            samples.len(),
            config.window_size
        );
    }

    // Stage 2: onsets
    let onsets = detect_onsets(
        &envelope,
        sample_rate,
        config.clamped_sensitivity(),
        config.smoothing_radius,
    );
    if onsets.is_empty() {
        log::warn!("No onsets detected");
        warnings.push("No onsets detected".to_string());
    }

    // Stage 3: tempo and offset
    let estimate = estimate_tempo_with_votes(&onsets, config);
    let bpm = estimate.map(|e| e.bpm);
    let offset_ms = match bpm {
        Some(bpm) => estimate_offset_ms(&onsets, bpm),
        None => {
            log::warn!("No tempo detected");
            warnings.push("No tempo detected".to_string());
            0.0
        }
    };

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Analysis complete: bpm {:?}, offset {} ms, {} onsets in {:.2} ms",
        bpm,
        offset_ms,
        onsets.len(),
        processing_time_ms
    );

    Ok(AudioAnalysis {
        bpm,
        offset_ms,
        onsets,
        metadata: AnalysisMetadata {
            duration_seconds: buffer.duration_seconds(),
            sample_rate,
            processing_time_ms,
            envelope_frames: envelope.len(),
            tempo_votes: estimate.map(|e| (e.votes, e.total_votes)),
            algorithm_version: ALGORITHM_VERSION.to_string(),
        },
        warnings,
    })
}

/// Turn an analysis into notes
///
/// # Arguments
///
/// * `samples` - The same mono samples that were analysed
/// * `sample_rate` - Sample rate in Hz
/// * `analysis` - Result of [`analyze`]
/// * `options` - Grid resolution and katsu bias
///
/// # Returns
///
/// Notes sorted by beat; empty when the analysis has no tempo or no onsets
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or zero snap
/// divisions
pub fn generate_notes(
    samples: &[f32],
    sample_rate: u32,
    analysis: &AudioAnalysis,
    options: &ChartOptions,
) -> Result<Vec<NoteEvent>, AnalysisError> {
    options.validate()?;
    check_samples(samples, sample_rate)?;

    let Some(bpm) = analysis.bpm else {
        log::debug!("No tempo, no notes");
        return Ok(Vec::new());
    };

    let buffer = SampleBuffer::new(samples, sample_rate);
    Ok(classify_onsets(
        &analysis.onsets,
        &buffer,
        bpm,
        analysis.offset_ms,
        options,
        TRANSIENT_WINDOW_SIZE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sample_rate_rejected() {
        let result = analyze(&[0.0; 16], 0, &AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_nan_sample_rejected() {
        let result = analyze(&[0.0, f32::NAN], 44100, &AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::NumericalError(_))));
    }

    #[test]
    fn test_empty_buffer_is_not_an_error() {
        let analysis = analyze(&[], 44100, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.bpm, None);
        assert!(analysis.onsets.is_empty());
        assert_eq!(analysis.metadata.envelope_frames, 0);

        let notes = generate_notes(&[], 44100, &analysis, &ChartOptions::default()).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_zero_divisions_rejected() {
        let analysis = analyze(&[], 44100, &AnalysisConfig::default()).unwrap();
        let options = ChartOptions {
            snap_divisions: 0,
            ..ChartOptions::default()
        };
        assert!(generate_notes(&[], 44100, &analysis, &options).is_err());
    }
}
