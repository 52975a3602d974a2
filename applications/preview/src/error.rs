/// Previewer error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreviewError>;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported preview location: {0}")]
    UnsupportedLocation(String),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Spectrum error: {0}")]
    Spectrum(#[from] beats_spectrum::SpectrumError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] beats_catalog::CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PreviewError> for beats_playback::PlaybackError {
    fn from(e: PreviewError) -> Self {
        beats_playback::PlaybackError::Load(e.to_string())
    }
}
