//! Error types for the playback platform boundary
//!
//! These only travel from platform implementations into the session. The
//! session turns every one of them into state; callers never see them.

use thiserror::Error;

/// Playback platform errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Media could not be loaded or decoded
    #[error("Failed to load media: {0}")]
    Load(String),

    /// The platform refused to start playback (e.g. autoplay policy)
    #[error("Playback rejected: {0}")]
    PlayRejected(String),

    /// Invalid seek position
    #[error("Invalid seek position: {0:?}")]
    InvalidSeekPosition(std::time::Duration),

    /// Frequency analyzer failure (connect or teardown)
    #[error("Analyzer error: {0}")]
    Analyzer(String),

    /// Any other platform failure
    #[error("Platform error: {0}")]
    Platform(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback platform operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
