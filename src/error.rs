//! Error types for the audio-to-chart pipeline
//!
//! Only caller contract violations and decoder failures are errors. Silent or
//! tempo-less audio is a legal input and chart-text problems are reported as
//! [`crate::chart::Diagnostic`] entries instead.

use std::fmt;

/// Errors that can occur during analysis or decoding
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters (zero sample rate, zero hop size, ...)
    InvalidInput(String),

    /// Audio decoding error
    DecodingError(String),

    /// Processing error during analysis
    ProcessingError(String),

    /// Numerical error (non-finite values, overflow, ...)
    NumericalError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::DecodingError(format!("File I/O error: {}", err))
    }
}

impl From<symphonia::core::errors::Error> for AnalysisError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AnalysisError::DecodingError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = AnalysisError::InvalidInput("Invalid sample rate".to_string());
        assert_eq!(err.to_string(), "Invalid input: Invalid sample rate");

        let err = AnalysisError::DecodingError("bad header".to_string());
        assert!(err.to_string().starts_with("Decoding error"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.wav");
        let err: AnalysisError = io.into();
        assert!(matches!(err, AnalysisError::DecodingError(_)));
    }
}
