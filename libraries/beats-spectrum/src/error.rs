//! Error types for frequency analysis

use thiserror::Error;

/// Analyzer configuration errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpectrumError {
    /// FFT size must be a power of two in 32..=32768
    #[error("Invalid FFT size {0}: must be a power of two between 32 and 32768")]
    InvalidFftSize(usize),

    /// `min_db` must be finite and below `max_db`
    #[error("Invalid decibel range: min {min} dB must be below max {max} dB")]
    InvalidDecibelRange {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// Smoothing must be in 0.0..=1.0
    #[error("Invalid smoothing {0}: must be between 0.0 and 1.0")]
    InvalidSmoothing(f32),
}

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, SpectrumError>;
