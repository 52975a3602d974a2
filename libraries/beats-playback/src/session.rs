//! Playback session - core orchestration
//!
//! Owns the currently selected track, its media graph and sampling task, and
//! the transport state (volume, mute, loop, position). Every platform failure
//! is absorbed here and turned into state; nothing propagates to the caller.

use crate::{
    events::{MediaEvent, SessionEvent},
    platform::{FrameScheduler, ManualScheduler, MediaBackend, MediaHandle},
    sampling::SamplingTask,
    snapshot::PlaybackSnapshot,
    types::{BindingId, PlayRequest, PlaybackFault, PlaybackStatus, SessionConfig},
    volume::Volume,
};
use beats_core::Track;
use std::time::Duration;

/// Media resources of the active binding
struct Binding {
    id: BindingId,
    media: Box<dyn MediaHandle>,
}

/// Preview playback session
///
/// State machine:
/// - `Idle → Loading` when a playable track is selected
/// - `Loading → Playing | Paused` when metadata resolves and autoplay succeeds or fails
/// - `Playing ⇄ Paused` on toggle or external pause/resume
/// - `Playing → Ended` at end of clip with looping off
/// - `any → Idle` on close
///
/// Volume, mute and loop carry over between tracks; position, duration,
/// spectrum and faults do not.
pub struct PlaybackSession {
    config: SessionConfig,
    backend: Box<dyn MediaBackend>,
    scheduler: Box<dyn FrameScheduler>,

    // State
    status: PlaybackStatus,
    active_track: Option<Track>,
    fault: Option<PlaybackFault>,
    elapsed: Duration,
    duration: Option<Duration>,

    // Settings
    volume: Volume,
    loop_enabled: bool,

    // Resources of the current binding
    binding: Option<Binding>,
    sampling: Option<SamplingTask>,
    last_binding: BindingId,

    spectrum: Vec<f32>,

    // Event queue for UI synchronization
    pending_events: Vec<SessionEvent>,
}

impl PlaybackSession {
    /// Create a session that builds media through `backend`
    ///
    /// Frames are polled by the host (see [`ManualScheduler`]) until
    /// [`with_scheduler`](Self::with_scheduler) installs a driver.
    pub fn new(config: SessionConfig, backend: Box<dyn MediaBackend>) -> Self {
        let mut volume = Volume::new(config.initial_volume);
        if config.muted {
            volume.mute();
        }

        Self {
            loop_enabled: config.loop_enabled,
            config,
            backend,
            scheduler: Box::new(ManualScheduler),
            status: PlaybackStatus::Idle,
            active_track: None,
            fault: None,
            elapsed: Duration::ZERO,
            duration: None,
            volume,
            binding: None,
            sampling: None,
            last_binding: BindingId::new(0),
            spectrum: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Install the host's frame scheduler
    pub fn with_scheduler(mut self, scheduler: Box<dyn FrameScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    // ===== Track Binding =====

    /// Bind a new track, or release the current one with `None`
    ///
    /// Position, duration and spectrum are reset before the new media starts
    /// loading. Tracks without a preview stay `Idle` with a `NoPreview` fault.
    /// Never blocks: metadata arrives later through
    /// [`handle_media_event`](Self::handle_media_event).
    pub fn select_track(&mut self, track: Option<Track>) {
        let Some(track) = track else {
            self.close();
            return;
        };

        self.teardown_binding();
        self.reset_track_state();

        let playable = track.is_playable();
        self.emit(SessionEvent::TrackBound {
            track_id: track.id.clone(),
            playable,
        });

        let uri = track.preview().map(str::to_owned);
        let Some(uri) = uri else {
            tracing::debug!(track = %track.id, "track has no preview, staying idle");
            self.active_track = Some(track);
            self.set_fault(PlaybackFault::NoPreview);
            self.set_status(PlaybackStatus::Idle);
            return;
        };

        let id = self.last_binding.next();
        self.last_binding = id;
        self.active_track = Some(track);

        match self.backend.build_graph(id, &uri) {
            Ok(graph) => {
                let mut media = graph.media;
                media.set_loop(self.loop_enabled);
                media.set_gain(self.volume.gain());

                if let Some(spectrum) = graph.spectrum {
                    self.sampling = Some(SamplingTask::new(id, spectrum));
                    self.scheduler.start(id);
                }

                self.binding = Some(Binding { id, media });
                tracing::debug!(binding = %id, uri = %uri, "media bound, loading");
                self.set_status(PlaybackStatus::Loading);
            }
            Err(e) => {
                tracing::warn!(binding = %id, uri = %uri, "failed to build media graph: {e}");
                self.set_fault(PlaybackFault::LoadFailed(e.to_string()));
                self.set_status(PlaybackStatus::Idle);
            }
        }
    }

    /// Release the track, its media and its analyzer
    ///
    /// Safe from any state and idempotent.
    pub fn close(&mut self) {
        self.teardown_binding();
        self.reset_track_state();

        if self.active_track.take().is_some() {
            self.emit(SessionEvent::TrackCleared);
        }
        self.set_status(PlaybackStatus::Idle);
    }

    // ===== Playback Control =====

    /// Pause when playing, resume when paused, restart when ended
    ///
    /// Restarting after the end rewinds to 0 unless the clip was seeked
    /// since it ended, in which case it resumes from there.
    ///
    /// No-op while idle, loading, or when the track is unplayable.
    pub fn toggle_playback(&mut self) {
        match self.status {
            PlaybackStatus::Playing => {
                if let Some(binding) = self.binding.as_mut() {
                    binding.media.pause();
                }
                self.set_status(PlaybackStatus::Paused);
            }
            PlaybackStatus::Paused => self.start_media(),
            PlaybackStatus::Ended => {
                // A seek made after the end is kept; otherwise restart from 0
                let at_end = self.elapsed.is_zero()
                    || self.duration.is_some_and(|duration| self.elapsed >= duration);
                if at_end {
                    if let Some(binding) = self.binding.as_mut() {
                        if let Err(e) = binding.media.seek(Duration::ZERO) {
                            tracing::warn!(binding = %binding.id, "rewind before restart failed: {e}");
                        }
                    }
                    self.elapsed = Duration::ZERO;
                    self.emit_position();
                }
                self.start_media();
            }
            PlaybackStatus::Idle | PlaybackStatus::Loading => {}
        }
    }

    // ===== Seek =====

    /// Seek to a fraction (0.0-1.0) of the clip
    ///
    /// Out-of-range input is clamped, NaN ignored. No-op while the duration
    /// is unknown. Never changes whether audio is playing.
    pub fn seek(&mut self, fraction: f32) {
        if fraction.is_nan() {
            return;
        }
        let Some(duration) = self.duration else {
            return;
        };

        let fraction = f64::from(fraction.clamp(0.0, 1.0));
        self.seek_to(duration.mul_f64(fraction));
    }

    /// Seek to an absolute position, clamped to the clip duration
    pub fn seek_to(&mut self, position: Duration) {
        let Some(duration) = self.duration else {
            return;
        };
        let Some(binding) = self.binding.as_mut() else {
            return;
        };

        let target = position.min(duration);
        match binding.media.seek(target) {
            Ok(()) => {
                self.elapsed = target;
                self.emit_position();
            }
            Err(e) => {
                tracing::warn!(binding = %binding.id, "seek to {target:?} failed: {e}");
            }
        }
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0), clamped; NaN is ignored
    ///
    /// While muted the level is stored but output stays silent.
    pub fn set_volume(&mut self, level: f32) {
        if self.volume.set_level(level) {
            self.apply_gain();
            self.emit_volume();
        }
    }

    /// Toggle mute; unmuting restores the stored level
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_gain();
        self.emit_volume();
    }

    /// Toggle looping, effective immediately on the bound media
    pub fn toggle_loop(&mut self) {
        self.loop_enabled = !self.loop_enabled;
        if let Some(binding) = self.binding.as_mut() {
            binding.media.set_loop(self.loop_enabled);
        }
        self.emit(SessionEvent::LoopChanged {
            enabled: self.loop_enabled,
        });
    }

    // ===== Platform Callbacks =====

    /// Apply a lifecycle event reported by the media of `binding`
    ///
    /// Events from any binding other than the current one are dropped.
    pub fn handle_media_event(&mut self, binding: BindingId, event: MediaEvent) {
        if !self.is_current(binding) {
            tracing::trace!(binding = %binding, ?event, "dropping event from stale binding");
            return;
        }

        match event {
            MediaEvent::MetadataLoaded { duration } => self.on_metadata(duration),
            MediaEvent::TimeUpdate { position } => {
                self.elapsed = match self.duration {
                    Some(duration) => position.min(duration),
                    None => position,
                };
                self.emit_position();
            }
            MediaEvent::Playing => {
                if matches!(
                    self.status,
                    PlaybackStatus::Loading | PlaybackStatus::Paused | PlaybackStatus::Ended
                ) {
                    self.fault = None;
                    self.set_status(PlaybackStatus::Playing);
                }
            }
            MediaEvent::Paused => {
                if self.status == PlaybackStatus::Playing {
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::PlaybackRejected { reason } => {
                if matches!(
                    self.status,
                    PlaybackStatus::Loading | PlaybackStatus::Playing | PlaybackStatus::Ended
                ) {
                    tracing::info!(binding = %binding, "play request rejected: {reason}");
                    self.set_fault(PlaybackFault::PlayRejected(reason));
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            MediaEvent::Error { message } => {
                tracing::warn!(binding = %binding, "media error: {message}");
                self.teardown_binding();
                self.elapsed = Duration::ZERO;
                self.duration = None;
                self.spectrum.clear();
                self.set_fault(PlaybackFault::LoadFailed(message));
                self.set_status(PlaybackStatus::Idle);
            }
        }
    }

    /// One tick of the sampling loop
    ///
    /// Returns the fresh frame, or `None` when `binding` is stale, no analyzer
    /// is connected, or playback is not running (sampling is suspended while
    /// not playing).
    pub fn on_animation_frame(&mut self, binding: BindingId) -> Option<&[f32]> {
        let task = self.sampling.as_mut()?;
        if task.binding() != binding || self.status != PlaybackStatus::Playing {
            return None;
        }

        task.sample(&mut self.spectrum);
        Some(&self.spectrum)
    }

    // ===== State Queries =====

    /// Current status
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Currently bound track
    pub fn active_track(&self) -> Option<&Track> {
        self.active_track.as_ref()
    }

    /// Elapsed time in the current clip
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Clip duration, once metadata has resolved
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Stored volume level (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    /// Mute flag
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Gain applied to the media output
    pub fn output_gain(&self) -> f32 {
        self.volume.gain()
    }

    /// Loop flag
    pub fn is_loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Latest spectrum frame
    pub fn spectrum(&self) -> &[f32] {
        &self.spectrum
    }

    /// Current fault, if the bound track is silent for a known reason
    pub fn fault(&self) -> Option<&PlaybackFault> {
        self.fault.as_ref()
    }

    /// Binding whose media events are currently accepted
    pub fn current_binding(&self) -> Option<BindingId> {
        self.binding.as_ref().map(|b| b.id)
    }

    /// Binding the sampling loop is running for, if any
    pub fn sampling_binding(&self) -> Option<BindingId> {
        self.sampling.as_ref().map(SamplingTask::binding)
    }

    /// Whether a frame tick right now would sample the analyzer
    pub fn wants_frames(&self) -> bool {
        self.sampling.is_some() && self.status == PlaybackStatus::Playing
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read-only projection for rendering
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            track: self.active_track.clone(),
            status: self.status,
            is_playing: self.is_playing(),
            elapsed: self.elapsed,
            duration: self.duration,
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            loop_enabled: self.loop_enabled,
            spectrum: self.spectrum.clone(),
            fault: self.fault.clone(),
        }
    }

    /// Take all events emitted since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal =====

    fn is_current(&self, binding: BindingId) -> bool {
        self.binding.as_ref().is_some_and(|b| b.id == binding)
    }

    fn on_metadata(&mut self, duration: Option<Duration>) {
        self.duration = duration.filter(|d| !d.is_zero());
        if let Some(duration) = self.duration {
            self.elapsed = self.elapsed.min(duration);
        }
        self.emit_position();

        if self.status != PlaybackStatus::Loading {
            // Duration refresh on an already running clip
            return;
        }

        if self.config.autoplay {
            self.start_media();
        } else {
            self.set_status(PlaybackStatus::Paused);
        }
    }

    fn on_ended(&mut self) {
        if !matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Paused) {
            return;
        }

        if self.loop_enabled {
            // Platforms that loop natively never report Ended; this covers
            // the ones that don't and a loop toggled right at the end.
            if let Some(binding) = self.binding.as_mut() {
                if let Err(e) = binding.media.seek(Duration::ZERO) {
                    tracing::warn!(binding = %binding.id, "rewind for loop failed: {e}");
                }
            }
            self.elapsed = Duration::ZERO;
            self.emit_position();
            self.start_media();
            return;
        }

        self.elapsed = Duration::ZERO;
        self.set_status(PlaybackStatus::Ended);
        self.emit_position();
        if let Some(track) = self.active_track.as_ref() {
            self.pending_events.push(SessionEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }
    }

    /// Ask the media to play; a refusal leaves the session paused
    ///
    /// Failed requests are not retried.
    fn start_media(&mut self) {
        let Some(binding) = self.binding.as_mut() else {
            return;
        };

        match binding.media.play() {
            Ok(PlayRequest::Started) => {
                self.fault = None;
                self.set_status(PlaybackStatus::Playing);
            }
            Ok(PlayRequest::Pending) => {
                tracing::trace!(binding = %binding.id, "play requested, awaiting confirmation");
            }
            Err(e) => {
                tracing::info!(binding = %binding.id, "play request refused: {e}");
                self.set_fault(PlaybackFault::PlayRejected(e.to_string()));
                self.set_status(PlaybackStatus::Paused);
            }
        }
    }

    /// Cancel sampling and release the media of the current binding
    fn teardown_binding(&mut self) {
        if let Some(task) = self.sampling.take() {
            self.scheduler.cancel();
            task.stop();
        }
        if let Some(mut binding) = self.binding.take() {
            binding.media.detach();
            tracing::debug!(binding = %binding.id, "media detached");
        }
    }

    fn reset_track_state(&mut self) {
        self.elapsed = Duration::ZERO;
        self.duration = None;
        self.spectrum.clear();
        self.fault = None;
    }

    fn apply_gain(&mut self) {
        if let Some(binding) = self.binding.as_mut() {
            binding.media.set_gain(self.volume.gain());
        }
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            tracing::debug!(from = %self.status, to = %status, "playback status changed");
            self.status = status;
            self.emit(SessionEvent::StateChanged { state: status });
        }
    }

    fn set_fault(&mut self, fault: PlaybackFault) {
        self.fault = Some(fault.clone());
        self.emit(SessionEvent::Fault { fault });
    }

    fn emit_position(&mut self) {
        self.emit(SessionEvent::PositionUpdate {
            position_ms: self.elapsed.as_millis() as u64,
            duration_ms: self.duration.map_or(0, |d| d.as_millis() as u64),
        });
    }

    fn emit_volume(&mut self) {
        self.emit(SessionEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn emit(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown_binding();
    }
}
