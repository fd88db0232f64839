//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Channel mixing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelMixMode {
    /// Keep channel 0 only
    #[default]
    FirstChannel,
    /// Simple average of all channels
    Average,
}

/// Reduce interleaved frames to a mono signal
///
/// # Arguments
///
/// * `interleaved` - Samples ordered frame by frame (`L R L R ...` for stereo)
/// * `channels` - Number of channels per frame
/// * `mode` - Mixing mode
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `channels` is zero or the buffer
/// length is not a whole number of frames
pub fn mix_to_mono(
    interleaved: &[f32],
    channels: usize,
    mode: ChannelMixMode,
) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }

    if interleaved.len() % channels != 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Buffer of {} samples is not a whole number of {}-channel frames",
            interleaved.len(),
            channels
        )));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!(
        "Mixing {} frames of {} channels to mono using {:?}",
        interleaved.len() / channels,
        channels,
        mode
    );

    let mono = match mode {
        ChannelMixMode::FirstChannel => interleaved.chunks_exact(channels).map(|f| f[0]).collect(),
        ChannelMixMode::Average => interleaved
            .chunks_exact(channels)
            .map(|f| f.iter().sum::<f32>() / channels as f32)
            .collect(),
    };

    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_channel() {
        let stereo = vec![1.0, -1.0, 0.5, 0.25];
        let mono = mix_to_mono(&stereo, 2, ChannelMixMode::FirstChannel).unwrap();
        assert_eq!(mono, vec![1.0, 0.5]);
    }

    #[test]
    fn test_average() {
        let stereo = vec![1.0, -1.0, 0.5, 0.25];
        let mono = mix_to_mono(&stereo, 2, ChannelMixMode::Average).unwrap();
        assert_eq!(mono, vec![0.0, 0.375]);
    }

    #[test]
    fn test_mono_passthrough() {
        let mono = mix_to_mono(&[0.1, 0.2, 0.3], 1, ChannelMixMode::Average).unwrap();
        assert_eq!(mono, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_ragged_buffer_rejected() {
        assert!(mix_to_mono(&[0.1, 0.2, 0.3], 2, ChannelMixMode::Average).is_err());
        assert!(mix_to_mono(&[0.1], 0, ChannelMixMode::Average).is_err());
    }
}
