//! Beats - Preview Playback
//!
//! Platform-agnostic playback session for song previews.
//!
//! This crate provides:
//! - One active preview at a time, with autoplay on load
//! - Play/pause/restart, fractional seek, volume, mute and loop
//! - Per-frame spectrum sampling tied to the lifetime of the bound track
//! - Stale-callback protection across rapid track switches
//! - A serializable event stream and snapshot for UI layers
//!
//! # Architecture
//!
//! `beats-playback` owns no audio I/O. The media element, the frequency
//! analyzer and the frame clock are supplied through traits
//! ([`MediaBackend`], [`MediaHandle`], [`SpectrumSource`],
//! [`FrameScheduler`]). The browser implementation lives behind the `wasm`
//! feature; the terminal previewer and the tests bring their own.
//!
//! Everything runs on one thread. Platform callbacks are delivered through
//! [`PlaybackSession::handle_media_event`] tagged with the [`BindingId`] they
//! belong to; callbacks for a binding that has been replaced are ignored.
//!
//! # Example: Platform Integration
//!
//! ```rust
//! use beats_core::Track;
//! use beats_playback::{
//!     BindingId, MediaBackend, MediaEvent, MediaGraph, MediaHandle, PlayRequest,
//!     PlaybackSession, PlaybackStatus, Result, SessionConfig,
//! };
//! use std::time::Duration;
//!
//! struct SilentMedia;
//!
//! impl MediaHandle for SilentMedia {
//!     fn play(&mut self) -> Result<PlayRequest> {
//!         Ok(PlayRequest::Started)
//!     }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: Duration) -> Result<()> {
//!         Ok(())
//!     }
//!     fn position(&self) -> Duration {
//!         Duration::ZERO
//!     }
//!     fn duration(&self) -> Option<Duration> {
//!         None
//!     }
//!     fn set_loop(&mut self, _enabled: bool) {}
//!     fn set_gain(&mut self, _gain: f32) {}
//!     fn detach(&mut self) {}
//! }
//!
//! struct SilentBackend;
//!
//! impl MediaBackend for SilentBackend {
//!     fn build_graph(&mut self, _binding: BindingId, _uri: &str) -> Result<MediaGraph> {
//!         Ok(MediaGraph::without_spectrum(Box::new(SilentMedia)))
//!     }
//! }
//!
//! let mut session = PlaybackSession::new(SessionConfig::default(), Box::new(SilentBackend));
//! session.select_track(Some(
//!     Track::new("1", "Srivalli", "Javed Ali").with_preview("https://cdn.example/srivalli.mp3"),
//! ));
//! assert_eq!(session.status(), PlaybackStatus::Loading);
//!
//! // The platform reports metadata later
//! let binding = session.current_binding().unwrap();
//! session.handle_media_event(binding, MediaEvent::metadata_from_secs(30.0));
//! assert!(session.is_playing());
//!
//! session.seek(0.5);
//! assert_eq!(session.elapsed(), Duration::from_secs(15));
//! ```

mod error;
pub mod events;
mod platform;
mod sampling;
mod session;
mod snapshot;
pub mod types;
mod volume;

#[cfg(test)]
mod testing;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::{MediaEvent, SessionEvent};
pub use platform::{
    FrameScheduler, ManualScheduler, MediaBackend, MediaGraph, MediaHandle, SpectrumSource,
};
pub use session::PlaybackSession;
pub use snapshot::{format_time, PlaybackSnapshot};
pub use types::{BindingId, PlayRequest, PlaybackFault, PlaybackStatus, SessionConfig};
pub use volume::Volume;
