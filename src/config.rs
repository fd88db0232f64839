//! Configuration parameters for analysis and chart generation

use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::ChannelMixMode;
use serde::{Deserialize, Serialize};

/// Lowest accepted onset sensitivity
pub const MIN_SENSITIVITY: f32 = 0.2;

/// Highest accepted onset sensitivity
pub const MAX_SENSITIVITY: f32 = 0.95;

/// Magnitude limit of the katsu bias
pub const MAX_KATSU_BIAS: f32 = 0.6;

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Framing
    /// Window size in samples for the RMS envelope (default: 1024)
    pub window_size: usize,

    /// Hop size in samples between envelope frames (default: 512)
    pub hop_size: usize,

    // Onset detection
    /// Radius of the moving-average smoother, in hops (default: 3)
    pub smoothing_radius: usize,

    /// Onset sensitivity (default: 0.6, clamped to [0.2, 0.95])
    /// Higher values lower the threshold and admit more onsets
    pub sensitivity: f32,

    // Tempo
    /// Shortest onset gap considered for tempo voting, in seconds (default: 0.2)
    pub min_interval_seconds: f64,

    /// Longest onset gap considered for tempo voting, in seconds (default: 2.0)
    pub max_interval_seconds: f64,

    /// Lower edge of the canonical tempo octave (default: 80.0)
    pub min_bpm: f64,

    /// Upper edge of the canonical tempo octave (default: 200.0)
    pub max_bpm: f64,

    // Decoding
    /// How multi-channel input is reduced to mono (default: first channel)
    pub channel_mix: ChannelMixMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 1024,
            hop_size: 512,
            smoothing_radius: 3,
            sensitivity: 0.6,
            min_interval_seconds: 0.2,
            max_interval_seconds: 2.0,
            min_bpm: 80.0,
            max_bpm: 200.0,
            channel_mix: ChannelMixMode::FirstChannel,
        }
    }
}

impl AnalysisConfig {
    /// Config with the given sensitivity and defaults elsewhere
    pub fn with_sensitivity(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            ..Self::default()
        }
    }

    /// Check the parameters the pipeline cannot recover from
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.window_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Window size must be > 0".to_string(),
            ));
        }
        if self.hop_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Hop size must be > 0".to_string(),
            ));
        }
        if !(self.min_bpm > 0.0 && self.min_bpm * 2.0 <= self.max_bpm) {
            return Err(AnalysisError::InvalidInput(format!(
                "Tempo octave [{}, {}) must span at least one doubling",
                self.min_bpm, self.max_bpm
            )));
        }
        if self.min_interval_seconds >= self.max_interval_seconds {
            return Err(AnalysisError::InvalidInput(format!(
                "Interval window ({}, {}) is empty",
                self.min_interval_seconds, self.max_interval_seconds
            )));
        }
        Ok(())
    }

    /// Sensitivity clamped to the supported range
    pub fn clamped_sensitivity(&self) -> f32 {
        self.sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
    }
}

/// Options for turning an analysis into notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Grid subdivisions per 4/4 measure (default: 16)
    pub snap_divisions: usize,

    /// Onset sensitivity for the analysis these notes come from; see
    /// [`ChartOptions::analysis_config`] (default: 0.6)
    pub sensitivity: f32,

    /// Shifts classification toward katsu (positive) or don (negative)
    /// (default: 0.0, clamped to [-0.6, 0.6])
    pub katsu_bias: f32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            snap_divisions: 16,
            sensitivity: 0.6,
            katsu_bias: 0.0,
        }
    }
}

impl ChartOptions {
    /// Check the grid resolution
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.snap_divisions == 0 {
            return Err(AnalysisError::InvalidInput(
                "Snap divisions must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Analysis settings matching these options
    ///
    /// Default [`AnalysisConfig`] with this `sensitivity`, so one set of
    /// chart options drives both [`crate::analyze`] and
    /// [`crate::generate_notes`].
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::with_sensitivity(self.sensitivity)
    }

    /// Effective grid resolution; anything finer than quarter notes is kept,
    /// coarser values are raised to 4
    pub fn effective_divisions(&self) -> usize {
        self.snap_divisions.max(4)
    }
}
