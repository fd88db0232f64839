//! Feature extraction modules
//!
//! This module contains the audio-to-events stages:
//! - Energy envelope (short-time RMS)
//! - Onset detection (smoothed envelope peak picking)
//! - Period estimation (interval histogram tempo, grid phase)
//! - Event classification (don/katsu, accents, grid snapping)

pub mod classify;
pub mod envelope;
pub mod onset;
pub mod period;
