//! Tempo estimation by interval histogram voting
//!
//! Every gap between consecutive onsets inside the accepted interval window
//! votes for one tempo. Votes are folded into a single octave by doubling or
//! halving, rounded to half-BPM buckets and counted. Buckets are kept in the
//! order they are first seen and the earliest bucket wins a tie, so the result
//! does not depend on hash iteration order.

use super::BpmEstimate;
use crate::config::AnalysisConfig;
use crate::features::onset::Onset;

/// Fold a tempo into `[min_bpm, max_bpm]` by doubling/halving
///
/// Assumes `min_bpm * 2 <= max_bpm` (see [`AnalysisConfig::validate`]).
pub fn fold_into_octave(mut bpm: f64, min_bpm: f64, max_bpm: f64) -> f64 {
    if !(bpm.is_finite() && bpm > 0.0) {
        return bpm;
    }
    while bpm < min_bpm {
        bpm *= 2.0;
    }
    while bpm > max_bpm {
        bpm /= 2.0;
    }
    bpm
}

/// Estimate tempo from onsets with the default interval window and octave
///
/// Returns `None` when no consecutive onset gap falls in (0.2 s, 2.0 s).
///
/// # Example
///
/// ```
/// use tja_autochart::features::onset::Onset;
/// use tja_autochart::features::period::estimate_tempo;
///
/// let onsets: Vec<Onset> = (0..8)
///     .map(|i| Onset { time: i as f64 * 0.5, energy: 1.0 })
///     .collect();
/// assert_eq!(estimate_tempo(&onsets), Some(120.0));
/// ```
pub fn estimate_tempo(onsets: &[Onset]) -> Option<f64> {
    estimate_tempo_with_votes(onsets, &AnalysisConfig::default()).map(|e| e.bpm)
}

/// Estimate tempo and report the vote counts
///
/// # Arguments
///
/// * `onsets` - Onsets ordered by time
/// * `config` - Supplies the interval window and the tempo octave
pub fn estimate_tempo_with_votes(onsets: &[Onset], config: &AnalysisConfig) -> Option<BpmEstimate> {
    if onsets.len() < 2 {
        return None;
    }

    // (half-BPM bucket, votes) in first-seen order
    let mut buckets: Vec<(i64, usize)> = Vec::new();
    let mut total_votes = 0usize;

    for pair in onsets.windows(2) {
        let delta = pair[1].time - pair[0].time;
        if !(delta > config.min_interval_seconds && delta < config.max_interval_seconds) {
            continue;
        }

        let bpm = fold_into_octave(60.0 / delta, config.min_bpm, config.max_bpm);
        let bucket = (bpm * 2.0).round() as i64;
        total_votes += 1;

        match buckets.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, votes)) => *votes += 1,
            None => buckets.push((bucket, 1)),
        }
    }

    let mut best: Option<(i64, usize)> = None;
    for &(bucket, votes) in &buckets {
        if best.map_or(true, |(_, best_votes)| votes > best_votes) {
            best = Some((bucket, votes));
        }
    }

    let (bucket, votes) = best?;
    let estimate = BpmEstimate {
        bpm: bucket as f64 / 2.0,
        votes,
        total_votes,
    };

    log::debug!(
        "Tempo histogram: {} buckets from {} intervals, winner {:.1} BPM with {} votes",
        buckets.len(),
        total_votes,
        estimate.bpm,
        votes
    );

    Some(estimate)
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
    fn test_exact_half_second_spacing() {
        let times: Vec<f64> = (0..16).map(|i| i as f64 * 0.5).collect();
        assert_eq!(estimate_tempo(&onsets_at(&times)), Some(120.0));
    }

    #[test]
    fn test_too_few_onsets() {
        assert_eq!(estimate_tempo(&[]), None);
        assert_eq!(estimate_tempo(&onsets_at(&[1.0])), None);
    }

    #[test]
    fn test_intervals_outside_window_rejected() {
        // 0.1 s and 3 s gaps never vote
        assert_eq!(estimate_tempo(&onsets_at(&[0.0, 0.1, 0.2, 3.2])), None);
        // Exactly 0.2 s is excluded (open interval)
        assert_eq!(estimate_tempo(&onsets_at(&[0.0, 0.2, 0.4])), None);
    }

    #[test]
    fn test_octave_folding() {
        // 1.0 s gaps = 60 BPM, doubled to 120
        let times: Vec<f64> = (0..6).map(|i| i as f64).collect();
        assert_eq!(estimate_tempo(&onsets_at(&times)), Some(120.0));
        // 0.25 s gaps = 240 BPM, halved to 120
        let times: Vec<f64> = (0..6).map(|i| i as f64 * 0.25).collect();
        assert_eq!(estimate_tempo(&onsets_at(&times)), Some(120.0));
    }

    #[test]
    fn test_half_bpm_rounding() {
        // 60 / 0.4967 = 120.8 -> 121.0
        let times: Vec<f64> = (0..5).map(|i| i as f64 * 0.4967).collect();
        assert_eq!(estimate_tempo(&onsets_at(&times)), Some(121.0));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        // One 0.5 s gap (120) then one 0.6 s gap (100): tie, 120 seen first
        assert_eq!(estimate_tempo(&onsets_at(&[0.0, 0.5, 1.1])), Some(120.0));
        assert_eq!(estimate_tempo(&onsets_at(&[0.0, 0.6, 1.1])), Some(100.0));
    }

    #[test]
    fn test_votes_reported() {
        let estimate = estimate_tempo_with_votes(
            &onsets_at(&[0.0, 0.5, 1.0, 1.5, 2.1]),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(estimate.bpm, 120.0);
        assert_eq!(estimate.votes, 3);
        assert_eq!(estimate.total_votes, 4);
        assert!((estimate.support() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_fold_into_octave() {
        assert_eq!(fold_into_octave(50.0, 80.0, 200.0), 100.0);
        assert_eq!(fold_into_octave(400.0, 80.0, 200.0), 200.0);
        assert_eq!(fold_into_octave(450.0, 80.0, 200.0), 112.5);
    }
}
