//! Error types for the catalog

use beats_core::TrackId;
use std::path::PathBuf;
use thiserror::Error;

/// Catalog and favorites errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not a JSON array of tracks
    #[error("Invalid catalog file {path}: {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Two catalog entries share an ID
    #[error("Duplicate track id: {0}")]
    DuplicateId(TrackId),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
