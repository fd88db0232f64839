//! Analysis result types

use crate::features::onset::Onset;
use serde::{Deserialize, Serialize};

/// Tempo, grid phase and onsets of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    /// Tempo in BPM, folded into [80, 200] and rounded to 0.5;
    /// `None` when no onset gap qualified
    pub bpm: Option<f64>,

    /// Grid phase in whole milliseconds; 0 without a tempo
    pub offset_ms: f64,

    /// Onsets ordered by time
    pub onsets: Vec<Onset>,

    /// Processing metadata
    pub metadata: AnalysisMetadata,

    /// Degenerate-input notices (silence, no tempo, ...)
    pub warnings: Vec<String>,
}

impl AudioAnalysis {
    /// True when a tempo was found
    pub fn has_tempo(&self) -> bool {
        self.bpm.is_some()
    }
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Audio duration in seconds
    pub duration_seconds: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Frames in the energy envelope
    pub envelope_frames: usize,

    /// Votes for the winning tempo bucket and votes cast in total
    pub tempo_votes: Option<(usize, usize)>,

    /// Algorithm version
    pub algorithm_version: String,
}
