//! Read-only projection of the session state for presentation code

use crate::types::{PlaybackFault, PlaybackStatus};
use beats_core::Track;
use serde::Serialize;
use std::time::Duration;

/// Snapshot of everything a player UI renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    /// Bound track, if any
    pub track: Option<Track>,

    /// Current status
    pub status: PlaybackStatus,

    /// Whether audio is currently playing
    pub is_playing: bool,

    /// Elapsed time
    pub elapsed: Duration,

    /// Total duration, once known
    pub duration: Option<Duration>,

    /// Stored volume level (0.0-1.0)
    pub volume: f32,

    /// Mute flag
    pub muted: bool,

    /// Loop flag
    pub loop_enabled: bool,

    /// Latest spectrum frame (empty when nothing has been sampled)
    pub spectrum: Vec<f32>,

    /// Why the bound track is silent, if it is
    pub fault: Option<PlaybackFault>,
}

impl PlaybackSnapshot {
    /// Fraction of the clip played (0.0-1.0); 0.0 while duration is unknown
    pub fn progress(&self) -> f32 {
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                (self.elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    /// Whether the bound track can be played at all
    pub fn playable(&self) -> bool {
        self.track.as_ref().is_some_and(Track::is_playable)
            && !matches!(
                self.fault,
                Some(PlaybackFault::NoPreview | PlaybackFault::LoadFailed(_))
            )
    }

    /// Elapsed time as `m:ss`
    pub fn elapsed_label(&self) -> String {
        format_time(self.elapsed)
    }

    /// Duration as `m:ss` (`0:00` while unknown)
    pub fn duration_label(&self) -> String {
        format_time(self.duration.unwrap_or(Duration::ZERO))
    }
}

/// Format a duration as `m:ss`
pub fn format_time(time: Duration) -> String {
    let secs = time.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
