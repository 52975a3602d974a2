/// Core error types for Beats
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Beats
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value could not be parsed into a domain type
    #[error("Invalid {kind}: {value}")]
    Parse {
        /// Name of the type being parsed
        kind: &'static str,
        /// The rejected input
        value: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Build a parse error for the given type name
    pub fn parse(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            value: value.into(),
        }
    }
}
