//! Audio preprocessing modules
//!
//! The analysis core assumes a mono signal; this module reduces decoded
//! multi-channel audio to one channel before framing.

pub mod channel_mixer;
