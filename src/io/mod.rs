//! Audio I/O modules
//!
//! Decoding (Symphonia) and the borrowed mono view the analysis reads from.

pub mod decoder;
pub mod sample_buffer;

pub use decoder::{decode_audio, DecodedAudio};
pub use sample_buffer::SampleBuffer;
