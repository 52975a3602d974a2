//! Playback Events
//!
//! Two directions:
//! - [`MediaEvent`] flows in from the platform (metadata, position, end, ...)
//! - [`SessionEvent`] flows out to the UI layer via
//!   [`PlaybackSession::drain_events`](crate::PlaybackSession::drain_events)

use crate::types::{PlaybackFault, PlaybackStatus};
use beats_core::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle notifications delivered by a media platform
///
/// Always paired with the [`BindingId`](crate::BindingId) of the media that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata resolved; `None` when the platform reports no finite duration
    MetadataLoaded {
        /// Total clip duration
        duration: Option<Duration>,
    },

    /// Periodic position report
    TimeUpdate {
        /// Current playback position
        position: Duration,
    },

    /// Playback started (or an asynchronous play request resolved)
    Playing,

    /// Playback paused outside the session (OS media keys, other tab, ...)
    Paused,

    /// Playback position reached the end
    Ended,

    /// An asynchronous play request was refused
    PlaybackRejected {
        /// Platform-supplied reason
        reason: String,
    },

    /// Loading or decoding failed
    Error {
        /// Platform-supplied message
        message: String,
    },
}

impl MediaEvent {
    /// Build `MetadataLoaded` from a platform duration in seconds
    ///
    /// Non-finite, negative and zero values mean "unknown".
    pub fn metadata_from_secs(secs: f64) -> Self {
        MediaEvent::MetadataLoaded {
            duration: duration_from_secs(secs),
        }
    }

    /// Build `TimeUpdate` from a platform position in seconds
    pub fn time_from_secs(secs: f64) -> Self {
        MediaEvent::TimeUpdate {
            position: duration_from_secs(secs).unwrap_or(Duration::ZERO),
        }
    }
}

/// Convert platform seconds into a duration, rejecting NaN/inf/non-positive
pub fn duration_from_secs(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Playback status changed
    StateChanged {
        /// The new status
        state: PlaybackStatus,
    },

    /// A new track became the active binding
    TrackBound {
        /// ID of the bound track
        track_id: TrackId,
        /// Whether the track has a usable preview
        playable: bool,
    },

    /// The active track was released (close or empty selection)
    TrackCleared,

    /// Position update
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration (0 = unknown)
        duration_ms: u64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Looping was switched on or off
    LoopChanged {
        /// New loop flag
        enabled: bool,
    },

    /// Track finished playing naturally (reached end, looping off)
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// The track cannot play right now
    Fault {
        /// What went wrong
        fault: PlaybackFault,
    },
}
