//! Transient ratio (percussive vs. tonal discriminant)
//!
//! Sum of first differences over sum of magnitudes in a window centred on the
//! onset. A first difference acts as a crude high-pass filter, so noisy rim
//! hits score high and sustained, low-pitched centre hits score low.

use crate::io::SampleBuffer;

/// Guards the division for silent windows
const EPSILON: f32 = 1e-6;

/// Window used by the chart generator, in samples
pub const TRANSIENT_WINDOW_SIZE: usize = 1024;

/// Transient ratio around `time_seconds`
///
/// # Arguments
///
/// * `buffer` - Mono samples
/// * `time_seconds` - Window centre
/// * `window_size` - Window length in samples (clipped at the buffer edges)
///
/// # Returns
///
/// `high / (energy + 1e-6)`; `0.0` for an empty or single-sample window
pub fn transient_ratio(buffer: &SampleBuffer<'_>, time_seconds: f64, window_size: usize) -> f32 {
    let window = buffer.centered_window(time_seconds, window_size);

    let (energy, high) = window.windows(2).fold((0.0f32, 0.0f32), |(energy, high), pair| {
        (energy + pair[1].abs(), high + (pair[1] - pair[0]).abs())
    });

    high / (energy + EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_zero() {
        let samples = vec![0.0f32; 4096];
        let buffer = SampleBuffer::new(&samples, 44100);
        assert_eq!(transient_ratio(&buffer, 0.05, 1024), 0.0);
    }

    #[test]
    fn test_alternating_scores_higher_than_sine() {
        let sr = 44100;
        let noisy: Vec<f32> = (0..4096).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let tonal: Vec<f32> = (0..4096)
            .map(|i| (i as f32 * 2.0 * std::f32::consts::PI * 100.0 / sr as f32).sin() * 0.5)
            .collect();

        let noisy_ratio = transient_ratio(&SampleBuffer::new(&noisy, sr), 0.05, 1024);
        let tonal_ratio = transient_ratio(&SampleBuffer::new(&tonal, sr), 0.05, 1024);

        // Alternating signal: every difference is twice the magnitude
        assert!((noisy_ratio - 2.0).abs() < 1e-3);
        assert!(tonal_ratio < 0.1);
    }

    #[test]
    fn test_window_past_end_is_zero() {
        let samples = vec![0.3f32; 100];
        let buffer = SampleBuffer::new(&samples, 100);
        assert_eq!(transient_ratio(&buffer, 10.0, 1024), 0.0);
    }
}
