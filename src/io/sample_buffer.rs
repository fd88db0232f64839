//! Borrowed mono sample view

/// Read-only view over a caller-owned mono buffer
#[derive(Debug, Clone, Copy)]
pub struct SampleBuffer<'a> {
    samples: &'a [f32],
    sample_rate: u32,
}

impl<'a> SampleBuffer<'a> {
    /// Wrap a mono buffer
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Underlying samples
    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (0 for a zero sample rate)
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Window of up to `size` samples centred on `time_seconds`
    ///
    /// The window is clipped at both buffer edges, so it can be shorter than
    /// `size` (or empty when the centre lies past the end).
    pub fn centered_window(&self, time_seconds: f64, size: usize) -> &'a [f32] {
        let center = (time_seconds.max(0.0) * self.sample_rate as f64).floor() as usize;
        let half = size / 2;
        let start = center.saturating_sub(half).min(self.samples.len());
        let end = center.saturating_add(half).min(self.samples.len());
        &self.samples[start..end]
    }
}
