//! Short-time RMS energy envelope
//!
//! Slices a mono buffer into overlapping windows, one per hop, and reports the
//! RMS of each. Frame `i` starts at sample `i * hop_size`, so its time is
//! `i * hop_size / sample_rate`.
//!
//! # Example
//!
//! ```
//! use tja_autochart::features::envelope::compute_energy_envelope;
//!
//! let samples = vec![0.5f32; 2048];
//! let envelope = compute_energy_envelope(&samples, 1024, 512);
//! assert_eq!(envelope.len(), 4);
//! ```

/// Short-time energy envelope, one value per hop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyEnvelope {
    /// RMS value per hop (non-negative)
    pub values: Vec<f32>,
    /// Hop size in samples
    pub hop_size: usize,
}

impl EnergyEnvelope {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no frames were produced
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Time in seconds of frame `index`
    pub fn frame_time(&self, index: usize, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        (index * self.hop_size) as f64 / sample_rate as f64
    }
}

/// Compute the RMS envelope
///
/// A frame starts at every hop; the last frames may see fewer than
/// `window_size` samples. The mean is always taken over the nominal
/// `window_size`, so a shortened tail window reads quieter than a full one.
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `window_size` - Window length in samples (typically 1024)
/// * `hop_size` - Hop between frame starts in samples (typically 512)
///
/// # Returns
///
/// The envelope; empty for empty input or a zero window/hop
pub fn compute_energy_envelope(samples: &[f32], window_size: usize, hop_size: usize) -> EnergyEnvelope {
    if samples.is_empty() || window_size == 0 || hop_size == 0 {
        return EnergyEnvelope {
            values: Vec::new(),
            hop_size,
        };
    }

    let num_frames = samples.len().div_ceil(hop_size);
    let mut values = Vec::with_capacity(num_frames);

    for start in (0..samples.len()).step_by(hop_size) {
        let end = (start + window_size).min(samples.len());
        let sum_sq: f32 = samples[start..end].iter().map(|&x| x * x).sum();
        values.push((sum_sq / window_size as f32).sqrt());
    }

    log::debug!(
        "Energy envelope: {} frames from {} samples (window={}, hop={})",
        values.len(),
        samples.len(),
        window_size,
        hop_size
    );

    EnergyEnvelope { values, hop_size }
}
