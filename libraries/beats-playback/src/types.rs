//! Core types for the playback session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No track bound, or the bound track cannot be played
    Idle,

    /// Track bound, waiting for metadata or for the platform to confirm play
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track (including after a rejected play request)
    Paused,

    /// Reached the end with looping disabled
    Ended,
}

impl PlaybackStatus {
    /// Lowercase name, as used by the JS bindings
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the bound track is not producing sound
///
/// Faults are informational. They never stop the session from accepting
/// further commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum PlaybackFault {
    /// Track has no preview locator
    NoPreview,

    /// Media failed to load or decode
    LoadFailed(String),

    /// Platform refused to start playback
    PlayRejected(String),
}

impl PlaybackFault {
    /// Whether the track can still be started by the user
    ///
    /// A rejected play request leaves the media loaded; the other faults don't.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlaybackFault::PlayRejected(_))
    }
}

impl fmt::Display for PlaybackFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackFault::NoPreview => f.write_str("Preview unavailable"),
            PlaybackFault::LoadFailed(reason) => write!(f, "Preview failed to load: {reason}"),
            PlaybackFault::PlayRejected(reason) => write!(f, "Press play to start: {reason}"),
        }
    }
}

/// Identity of one media binding
///
/// Every platform callback is tagged with the binding it belongs to, so that
/// late callbacks from a replaced track can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(u64);

impl BindingId {
    /// Wrap a raw binding number
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw binding number
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of asking the platform to start playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRequest {
    /// Playback started synchronously
    Started,

    /// The platform will confirm later with `MediaEvent::Playing` or
    /// `MediaEvent::PlaybackRejected`
    Pending,
}

/// Configuration for a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Initial volume (0.0-1.0, default: 0.9)
    pub initial_volume: f32,

    /// Start muted (default: false)
    pub muted: bool,

    /// Loop the preview (default: false)
    pub loop_enabled: bool,

    /// Start playing as soon as metadata is ready (default: true)
    pub autoplay: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.9,
            muted: false,
            loop_enabled: false,
            autoplay: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.initial_volume, 0.9);
        assert!(!config.muted);
        assert!(!config.loop_enabled);
        assert!(config.autoplay);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"loop_enabled": true}"#).unwrap();
        assert!(config.loop_enabled);
        assert_eq!(config.initial_volume, 0.9);
    }

    #[test]
    fn fault_serializes_with_kind_tag() {
        let json = serde_json::to_string(&PlaybackFault::LoadFailed("404".into())).unwrap();
        assert_eq!(json, r#"{"kind":"load_failed","reason":"404"}"#);

        let json = serde_json::to_string(&PlaybackFault::NoPreview).unwrap();
        assert_eq!(json, r#"{"kind":"no_preview"}"#);
    }

    #[test]
    fn only_rejected_play_is_recoverable() {
        assert!(PlaybackFault::PlayRejected("autoplay".into()).is_recoverable());
        assert!(!PlaybackFault::NoPreview.is_recoverable());
        assert!(!PlaybackFault::LoadFailed("decode".into()).is_recoverable());
    }

    #[test]
    fn binding_ids_increase() {
        let first = BindingId::new(1);
        assert!(first.next() > first);
        assert_eq!(first.to_string(), "#1");
    }
}
