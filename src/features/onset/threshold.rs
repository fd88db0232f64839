//! Adaptive thresholding utilities
//!
//! Percentile and quantile lookups over sorted copies of a value set, plus the
//! moving-average smoother applied to the envelope before peak picking. The
//! event classifier reuses the same lookups for its ratio and accent
//! thresholds.
//!
//! Two index conventions are used on purpose and must not be mixed up:
//! [`percentile_threshold`] indexes `floor(n * p)` (clamped), while
//! [`quantile_threshold`] indexes `floor(p * (n - 1))`. Index arithmetic is
//! done in `f64` so that e.g. `20 * 0.95` lands on 19, not 18.

use std::cmp::Ordering;

fn sorted_copy(values: &[f32]) -> Vec<f32> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Value at `floor(len * percentile)` of the sorted values
///
/// # Arguments
///
/// * `values` - Values to threshold
/// * `percentile` - Fraction in [0.0, 1.0], e.g. 0.6 for the 60th percentile
///
/// # Returns
///
/// `None` for an empty slice
pub fn percentile_threshold(values: &[f32], percentile: f64) -> Option<f32> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted_copy(values);
    let idx = ((sorted.len() as f64) * percentile.clamp(0.0, 1.0)) as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// Value at `floor(quantile * (len - 1))` of the sorted values
///
/// `None` for an empty slice.
pub fn quantile_threshold(values: &[f32], quantile: f64) -> Option<f32> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted_copy(values);
    let idx = (quantile.clamp(0.0, 1.0) * (sorted.len() - 1) as f64) as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// Median (mean of the two middle values for even lengths), `0.0` when empty
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}

/// Symmetric moving average
///
/// Each output is the mean of the inputs within `radius` positions on either
/// side, truncated at the edges. A radius of zero is treated as one.
pub fn smooth_moving_average(values: &[f32], radius: usize) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }

    let radius = radius.max(1);
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(radius);
            let end = (i + radius + 1).min(values.len());
            let window = &values[start..end];
            window.iter().sum::<f32>() / window.len() as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_threshold_basic() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        // floor(5 * 0.8) = 4
        assert_eq!(percentile_threshold(&values, 0.8), Some(5.0));
        // floor(5 * 0.5) = 2
        assert_eq!(percentile_threshold(&values, 0.5), Some(3.0));
        assert_eq!(percentile_threshold(&values, 1.0), Some(5.0));
    }

    #[test]
    fn test_percentile_threshold_unsorted_input() {
        let values = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile_threshold(&values, 0.6), Some(4.0));
    }

    #[test]
    fn test_percentile_threshold_empty() {
        assert_eq!(percentile_threshold(&[], 0.6), None);
    }

    #[test]
    fn test_quantile_threshold_index() {
        let values: Vec<f32> = (0..10).map(|i| i as f32).collect();
        // floor(0.65 * 9) = 5
        assert_eq!(quantile_threshold(&values, 0.65), Some(5.0));
        assert_eq!(quantile_threshold(&[7.0], 0.85), Some(7.0));
        assert_eq!(quantile_threshold(&[], 0.5), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_smoothing_edges_truncate() {
        let values = vec![3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let smoothed = smooth_moving_average(&values, 3);
        assert_eq!(smoothed.len(), values.len());
        // index 0 averages indices 0..=3
        assert!((smoothed[0] - 0.75).abs() < 1e-6);
        // index 3 averages indices 0..=6
        assert!((smoothed[3] - 3.0 / 7.0).abs() < 1e-6);
        assert_eq!(smoothed[7], 0.0);
    }

    #[test]
    fn test_smoothing_zero_radius_acts_as_one() {
        let smoothed = smooth_moving_average(&[0.0, 3.0, 0.0], 0);
        assert!((smoothed[1] - 1.0).abs() < 1e-6);
    }
}
