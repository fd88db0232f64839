//! Onset detection
//!
//! Peak picking over the smoothed energy envelope:
//! 1. Moving-average smoothing (radius in hops)
//! 2. Adaptive threshold between the 60th and 90th percentile of the smoothed
//!    values, positioned by the sensitivity
//! 3. Interior local maxima above threshold (`> left`, `>= right`, so a
//!    plateau reports its first index)
//!
//! # Example
//!
//! ```
//! use tja_autochart::features::envelope::EnergyEnvelope;
//! use tja_autochart::features::onset::detect_onsets;
//!
//! let mut values = vec![0.0f32; 64];
//! values[32] = 1.0;
//! let envelope = EnergyEnvelope { values, hop_size: 512 };
//! let onsets = detect_onsets(&envelope, 44100, 0.6, 3);
//! assert_eq!(onsets.len(), 1);
//! ```

pub mod threshold;

use crate::config::{MAX_SENSITIVITY, MIN_SENSITIVITY};
use crate::features::envelope::EnergyEnvelope;
use serde::{Deserialize, Serialize};
use threshold::{percentile_threshold, smooth_moving_average};

/// Detected onset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Onset {
    /// Onset time in seconds
    pub time: f64,

    /// Smoothed envelope energy at the onset
    pub energy: f32,
}

/// Threshold for a smoothed envelope at the given sensitivity
///
/// `p60 + (p90 - p60) * (1 - sensitivity)` with the sensitivity clamped to
/// [0.2, 0.95]. `None` for an empty envelope.
pub fn onset_threshold(smoothed: &[f32], sensitivity: f32) -> Option<f32> {
    let p60 = percentile_threshold(smoothed, 0.6)?;
    let p90 = percentile_threshold(smoothed, 0.9).unwrap_or(p60);
    let weight = 1.0 - sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
    Some(p60 + (p90 - p60) * weight)
}

/// Detect onsets in an energy envelope
///
/// # Arguments
///
/// * `envelope` - Energy envelope from [`crate::features::envelope::compute_energy_envelope`]
/// * `sample_rate` - Sample rate of the analysed buffer in Hz
/// * `sensitivity` - Onset sensitivity, clamped to [0.2, 0.95]
/// * `smoothing_radius` - Moving-average radius in hops (typically 3)
///
/// # Returns
///
/// Onsets ordered by time, at most one per envelope frame
pub fn detect_onsets(
    envelope: &EnergyEnvelope,
    sample_rate: u32,
    sensitivity: f32,
    smoothing_radius: usize,
) -> Vec<Onset> {
    let smoothed = smooth_moving_average(&envelope.values, smoothing_radius);
    if smoothed.len() < 3 {
        return Vec::new();
    }

    let threshold = match onset_threshold(&smoothed, sensitivity) {
        Some(t) => t,
        None => return Vec::new(),
    };

    log::debug!(
        "Onset threshold {:.6} over {} smoothed frames (sensitivity {:.2})",
        threshold,
        smoothed.len(),
        sensitivity
    );

    let onsets: Vec<Onset> = (1..smoothed.len() - 1)
        .filter(|&i| {
            let value = smoothed[i];
            value > threshold && value > smoothed[i - 1] && value >= smoothed[i + 1]
        })
        .map(|i| Onset {
            time: envelope.frame_time(i, sample_rate),
            energy: smoothed[i],
        })
        .collect();

    log::debug!("Detected {} onsets", onsets.len());

    onsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(values: Vec<f32>) -> EnergyEnvelope {
        EnergyEnvelope {
            values,
            hop_size: 512,
        }
    }

    #[test]
    fn test_too_short_envelope() {
        assert!(detect_onsets(&envelope(vec![]), 44100, 0.6, 3).is_empty());
        assert!(detect_onsets(&envelope(vec![1.0]), 44100, 0.6, 3).is_empty());
    }

    #[test]
    fn test_flat_envelope_has_no_onsets() {
        let env = envelope(vec![0.3; 100]);
        assert!(detect_onsets(&env, 44100, 0.9, 3).is_empty());
    }

    #[test]
    fn test_isolated_spikes() {
        let mut values = vec![0.0f32; 200];
        for &i in &[20usize, 60, 100, 140] {
            values[i] = 1.0;
        }
        let onsets = detect_onsets(&envelope(values), 44100, 0.6, 3);
        assert_eq!(onsets.len(), 4);
        // Smoothing spreads each spike into a plateau; the first index wins
        let first_frame = (onsets[0].time * 44100.0 / 512.0).round() as usize;
        assert_eq!(first_frame, 17);
        assert!(onsets.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_sensitivity_monotonic() {
        // Spikes of different heights: higher sensitivity admits more of them
        let mut values = vec![0.0f32; 400];
        for (k, i) in (20..400).step_by(20).enumerate() {
            values[i] = 0.1 + 0.05 * k as f32;
        }
        let env = envelope(values);
        let low = detect_onsets(&env, 44100, 0.2, 3).len();
        let high = detect_onsets(&env, 44100, 0.9, 3).len();
        assert!(high >= low);
    }

    #[test]
    fn test_threshold_formula() {
        let values: Vec<f32> = (0..10).map(|i| i as f32).collect();
        // p60 = sorted[6] = 6, p90 = sorted[9] = 9, weight = 0.5
        let t = onset_threshold(&values, 0.5).unwrap();
        assert!((t - 7.5).abs() < 1e-6);
        // Out-of-range sensitivity is clamped to 0.95
        let t = onset_threshold(&values, 2.0).unwrap();
        assert!((t - 6.15).abs() < 1e-4);
    }
}
