//! Adaptive classification thresholds
//!
//! Both thresholds are derived from the whole onset set and shifted by the
//! katsu bias (normalised to [-1, 1]):
//! - katsu threshold: ratio quantile `clamp(0.65 - 0.2 * bias, 0.35, 0.85)`
//! - accent threshold: `p85 + (p95 - p85) * clamp(0.55 - 0.1 * bias, 0.35, 0.75)`
//!   over onset energies

use crate::config::MAX_KATSU_BIAS;
use crate::features::onset::threshold::{percentile_threshold, quantile_threshold};

fn normalize_bias(katsu_bias: f32) -> f64 {
    let limit = MAX_KATSU_BIAS as f64;
    (katsu_bias as f64).clamp(-limit, limit) / limit
}

/// Quantile of the transient ratios at which katsu starts
pub fn katsu_quantile(katsu_bias: f32) -> f64 {
    (0.65 - normalize_bias(katsu_bias) * 0.2).clamp(0.35, 0.85)
}

/// Blend factor between the 85th and 95th energy percentile
pub fn accent_blend(katsu_bias: f32) -> f64 {
    (0.55 - normalize_bias(katsu_bias) * 0.1).clamp(0.35, 0.75)
}

/// Ratio at or above which an onset is classified as katsu
///
/// `0.0` for an empty set.
pub fn katsu_threshold(ratios: &[f32], katsu_bias: f32) -> f32 {
    quantile_threshold(ratios, katsu_quantile(katsu_bias)).unwrap_or(0.0)
}

/// Energy at or above which an onset is accented
///
/// Positive infinity for an empty set, so nothing is accented.
pub fn accent_threshold(energies: &[f32], katsu_bias: f32) -> f32 {
    let p85 = match percentile_threshold(energies, 0.85) {
        Some(p) => p,
        None => return f32::INFINITY,
    };
    let p95 = percentile_threshold(energies, 0.95).unwrap_or(p85);
    p85 + (p95 - p85) * accent_blend(katsu_bias) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_katsu_quantile_range() {
        assert!((katsu_quantile(0.0) - 0.65).abs() < 1e-6);
        assert!((katsu_quantile(0.6) - 0.45).abs() < 1e-6);
        assert!((katsu_quantile(-0.6) - 0.85).abs() < 1e-6);
        // Clamped bias
        assert!((katsu_quantile(5.0) - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_positive_bias_lowers_katsu_threshold() {
        let ratios: Vec<f32> = (0..20).map(|i| i as f32 * 0.1).collect();
        assert!(katsu_threshold(&ratios, 0.6) < katsu_threshold(&ratios, -0.6));
    }

    #[test]
    fn test_empty_sets() {
        assert_eq!(katsu_threshold(&[], 0.0), 0.0);
        assert!(accent_threshold(&[], 0.0).is_infinite());
    }

    #[test]
    fn test_accent_threshold_blend() {
        let energies: Vec<f32> = (0..20).map(|i| i as f32).collect();
        // p85 = sorted[17] = 17, p95 = sorted[19] = 19, blend 0.55
        let t = accent_threshold(&energies, 0.0);
        assert!((t - 18.1).abs() < 1e-4);
    }

    #[test]
    fn test_accent_threshold_single_value() {
        assert_eq!(accent_threshold(&[0.4], 0.3), 0.4);
    }
}
