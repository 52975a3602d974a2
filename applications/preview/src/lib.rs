//! Beats Preview
//!
//! Terminal previewer for the Beats catalog. Decodes a clip with symphonia,
//! plays it on a simulated transport through the shared
//! [`PlaybackSession`](beats_playback::PlaybackSession), and draws the live
//! spectrum as text.
//!
//! This library exposes the pieces of the `beats-preview` binary for testing.

pub mod backend;
pub mod clip;
pub mod config;
pub mod error;
pub mod library;
pub mod player;
pub mod render;

pub use backend::ClipDeck;
pub use clip::DecodedClip;
pub use config::PreviewConfig;
pub use error::{PreviewError, Result};
pub use library::Library;
pub use player::{PlayOptions, PlaySummary, Player};
