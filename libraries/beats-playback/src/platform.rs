//! Platform-agnostic media traits
//!
//! Abstracts the host's media element and frequency analyzer so the session
//! logic runs the same in a browser, in a terminal, and under test fakes.
//!
//! All traits are single-threaded: implementations may hold `Rc`s and JS
//! handles, and callbacks are delivered on the same thread that owns the
//! session.

use crate::error::Result;
use crate::types::{BindingId, PlayRequest};
use std::time::Duration;

/// Handle to one loaded media source
///
/// Created by a [`MediaBackend`] for exactly one binding and dropped when the
/// session moves on. Lifecycle notifications (metadata, position, end) are
/// reported asynchronously through
/// [`PlaybackSession::handle_media_event`](crate::PlaybackSession::handle_media_event).
pub trait MediaHandle {
    /// Ask the platform to start or resume playback
    ///
    /// # Returns
    /// * `Ok(PlayRequest::Started)` - Playing now
    /// * `Ok(PlayRequest::Pending)` - Confirmation follows as a media event
    /// * `Err(_)` - Refused synchronously (autoplay policy, broken media)
    fn play(&mut self) -> Result<PlayRequest>;

    /// Pause playback
    fn pause(&mut self);

    /// Seek to position in the clip
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Total duration, once metadata has resolved
    fn duration(&self) -> Option<Duration>;

    /// Loop at end of clip instead of reporting `Ended`
    fn set_loop(&mut self, enabled: bool);

    /// Output gain (0.0-1.0), already accounting for mute
    fn set_gain(&mut self, gain: f32);

    /// Stop output and release the underlying source
    ///
    /// Called exactly once, when the binding is torn down. Must not fail.
    fn detach(&mut self);
}

/// Per-frame frequency magnitudes of connected audio
pub trait SpectrumSource {
    /// Number of frequency bins in each frame
    fn bin_count(&self) -> usize;

    /// Fill `frame` with the current magnitudes, normalized to 0.0-1.0
    ///
    /// `frame.len()` equals [`bin_count`](Self::bin_count).
    fn read_frame(&mut self, frame: &mut [f32]);

    /// Disconnect from the audio graph
    ///
    /// Failures (e.g. the audio context is already gone) are tolerated by the
    /// caller.
    fn disconnect(&mut self) -> Result<()>;
}

/// The audio graph owned by one binding: source → analyzer → output
pub struct MediaGraph {
    /// Playable media
    pub media: Box<dyn MediaHandle>,

    /// Frequency analyzer tapping the media, if the platform could connect one
    pub spectrum: Option<Box<dyn SpectrumSource>>,
}

impl MediaGraph {
    /// Graph with media and analyzer
    pub fn new(media: Box<dyn MediaHandle>, spectrum: Box<dyn SpectrumSource>) -> Self {
        Self {
            media,
            spectrum: Some(spectrum),
        }
    }

    /// Graph without an analyzer (visualizer stays empty)
    pub fn without_spectrum(media: Box<dyn MediaHandle>) -> Self {
        Self {
            media,
            spectrum: None,
        }
    }
}

/// Builds a fresh media graph for each binding
///
/// Graphs are never reused across bindings. Loading starts inside
/// `build_graph`; the result arrives later as `MediaEvent::MetadataLoaded` or
/// `MediaEvent::Error` tagged with `binding`.
pub trait MediaBackend {
    /// Create media + analyzer for `uri` and begin loading
    fn build_graph(&mut self, binding: BindingId, uri: &str) -> Result<MediaGraph>;
}

/// Host-side driver of the per-frame sampling loop
///
/// The session starts the loop when a binding with an analyzer becomes active
/// and cancels it on every track change and on close. While running, the host
/// calls [`PlaybackSession::on_animation_frame`](crate::PlaybackSession::on_animation_frame)
/// once per display frame with the binding passed to `start`.
pub trait FrameScheduler {
    /// Begin delivering frames for `binding`, replacing any running loop
    fn start(&mut self, binding: BindingId);

    /// Cancel the running loop; no frame may be delivered afterwards
    fn cancel(&mut self);
}

/// Scheduler for hosts that poll
///
/// Does nothing itself; the host checks
/// [`PlaybackSession::sampling_binding`](crate::PlaybackSession::sampling_binding)
/// on its own timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualScheduler;

impl FrameScheduler for ManualScheduler {
    fn start(&mut self, _binding: BindingId) {}

    fn cancel(&mut self) {}
}
