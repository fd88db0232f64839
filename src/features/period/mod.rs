//! Period estimation modules
//!
//! Convert an onset list to a tempo and a grid phase:
//! - Interval histogram voting with octave folding
//! - Median phase residual against the beat grid

pub mod offset;
pub mod tempo_histogram;

pub use offset::estimate_offset_ms;
pub use tempo_histogram::{estimate_tempo, estimate_tempo_with_votes};

/// Winning tempo and its support
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmEstimate {
    /// Tempo in BPM, folded into the canonical octave and rounded to 0.5
    pub bpm: f64,

    /// Votes received by the winning bucket
    pub votes: usize,

    /// Qualifying intervals that voted in total
    pub total_votes: usize,
}

impl BpmEstimate {
    /// Share of votes the winner received (0.0-1.0)
    pub fn support(&self) -> f32 {
        if self.total_votes == 0 {
            return 0.0;
        }
        self.votes as f32 / self.total_votes as f32
    }
}
