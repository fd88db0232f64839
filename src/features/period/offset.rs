//! Grid phase (offset) estimation
//!
//! Each onset's position modulo the beat duration is its phase on the tempo
//! grid; the median phase is taken as the chart offset.

use crate::features::onset::threshold::median;
use crate::features::onset::Onset;

/// Median beat phase of the onsets, in whole milliseconds
///
/// Returns `0.0` when there are no onsets or the tempo is not a positive
/// finite number.
///
/// # Example
///
/// ```
/// use tja_autochart::features::onset::Onset;
/// use tja_autochart::features::period::estimate_offset_ms;
///
/// let onsets: Vec<Onset> = (0..8)
///     .map(|i| Onset { time: 0.1 + i as f64 * 0.5, energy: 1.0 })
///     .collect();
/// assert_eq!(estimate_offset_ms(&onsets, 120.0), 100.0);
/// ```
pub fn estimate_offset_ms(onsets: &[Onset], bpm: f64) -> f64 {
    if onsets.is_empty() || !(bpm.is_finite() && bpm > 0.0) {
        return 0.0;
    }

    let beat_duration = 60.0 / bpm;
    let phases: Vec<f64> = onsets.iter().map(|o| o.time % beat_duration).collect();
    let phase = median(&phases);

    log::debug!(
        "Offset: median phase {:.4}s over {} onsets (beat {:.4}s)",
        phase,
        onsets.len(),
        beat_duration
    );

    (phase * 1000.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onsets_at(times: &[f64]) -> Vec<Onset> {
        times
            .iter()
            .map(|&time| Onset { time, energy: 1.0 })
            .collect()
    }

    #[test]
    fn test_on_grid_is_zero() {
        let times: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
        assert_eq!(estimate_offset_ms(&onsets_at(&times), 120.0), 0.0);
    }

    #[test]
    fn test_constant_phase() {
        let times: Vec<f64> = (0..8).map(|i| 0.25 + i as f64 * 0.5).collect();
        assert_eq!(estimate_offset_ms(&onsets_at(&times), 120.0), 250.0);
    }

    #[test]
    fn test_median_resists_outlier() {
        let times = [0.1, 0.6, 1.1, 1.6, 2.45];
        assert_eq!(estimate_offset_ms(&onsets_at(&times), 120.0), 100.0);
    }

    #[test]
    fn test_no_tempo_or_onsets() {
        assert_eq!(estimate_offset_ms(&[], 120.0), 0.0);
        assert_eq!(estimate_offset_ms(&onsets_at(&[0.3]), 0.0), 0.0);
    }
}
