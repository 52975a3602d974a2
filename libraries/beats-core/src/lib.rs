//! Beats Core
//!
//! Platform-agnostic domain types shared by every Beats crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `Mood`
//! - **Preferences**: `ThemePreference`, `Language`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use beats_core::{Mood, Track};
//!
//! let track = Track::new("1", "Srivalli", "Javed Ali")
//!     .with_moods([Mood::Melody, Mood::Romantic])
//!     .with_preview("https://cdn.example.com/srivalli.mp3");
//!
//! assert!(track.is_playable());
//! assert!(track.has_mood(&Mood::Romantic));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod preferences;
pub mod types;

pub use error::{CoreError, Result};
pub use preferences::{Language, ThemePreference};
pub use types::{Mood, Track, TrackId};
