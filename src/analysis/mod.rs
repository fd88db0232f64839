//! Analysis result types
//!
//! The tempo/offset/onset summary returned by [`crate::analyze`] and the
//! processing metadata attached to it.

pub mod result;
