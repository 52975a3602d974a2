//! WASM-compatible PlaybackSession wrapper

use super::backend::{MediaInbox, WebAudioBackend};
use super::scheduler::AnimationFrameScheduler;
use crate::{BindingId, PlaybackSession, SessionConfig, SessionEvent};
use beats_core::Track;
use js_sys::{Float32Array, Function};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;

/// JavaScript callbacks, all optional
#[derive(Default, Clone)]
struct Callbacks {
    on_state_change: Option<Function>,
    on_position: Option<Function>,
    on_volume_change: Option<Function>,
    on_loop_change: Option<Function>,
    on_spectrum: Option<Function>,
    on_track_finished: Option<Function>,
    on_fault: Option<Function>,
}

impl Callbacks {
    /// Invoke the callback for each event
    ///
    /// Runs with the session released, so callbacks may call back into it.
    fn dispatch(&self, events: Vec<SessionEvent>) {
        for event in events {
            let result = match event {
                SessionEvent::StateChanged { state } => self
                    .on_state_change
                    .as_ref()
                    .map(|f| f.call1(&JsValue::NULL, &JsValue::from_str(state.as_str()))),
                SessionEvent::PositionUpdate {
                    position_ms,
                    duration_ms,
                } => self.on_position.as_ref().map(|f| {
                    f.call2(
                        &JsValue::NULL,
                        &JsValue::from_f64(position_ms as f64 / 1000.0),
                        &JsValue::from_f64(duration_ms as f64 / 1000.0),
                    )
                }),
                SessionEvent::VolumeChanged { level, is_muted } => {
                    self.on_volume_change.as_ref().map(|f| {
                        f.call2(
                            &JsValue::NULL,
                            &JsValue::from_f64(f64::from(level)),
                            &JsValue::from_bool(is_muted),
                        )
                    })
                }
                SessionEvent::LoopChanged { enabled } => self
                    .on_loop_change
                    .as_ref()
                    .map(|f| f.call1(&JsValue::NULL, &JsValue::from_bool(enabled))),
                SessionEvent::TrackFinished { track_id } => self
                    .on_track_finished
                    .as_ref()
                    .map(|f| f.call1(&JsValue::NULL, &JsValue::from_str(track_id.as_str()))),
                SessionEvent::Fault { fault } => self.on_fault.as_ref().map(|f| {
                    let value = serde_wasm_bindgen::to_value(&fault).unwrap_or(JsValue::NULL);
                    f.call1(&JsValue::NULL, &value)
                }),
                SessionEvent::TrackBound { .. } | SessionEvent::TrackCleared => None,
            };

            if let Some(Err(e)) = result {
                tracing::warn!("session callback threw: {e:?}");
            }
        }
    }
}

struct Inner {
    session: PlaybackSession,
    callbacks: Callbacks,
}

impl Inner {
    fn take_events(&mut self) -> (Vec<SessionEvent>, Callbacks) {
        (self.session.drain_events(), self.callbacks.clone())
    }
}

/// Sample one frame and hand it to the spectrum callback
fn frame(inner: &RefCell<Inner>, binding: BindingId) {
    let (callback, array) = {
        let Ok(mut inner) = inner.try_borrow_mut() else {
            return;
        };
        let callback = inner.callbacks.on_spectrum.clone();
        let Some(frame) = inner.session.on_animation_frame(binding) else {
            return;
        };
        (callback, Float32Array::from(frame))
    };

    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, &array) {
            tracing::warn!("spectrum callback threw: {e:?}");
        }
    }
}

/// WASM-compatible playback session
///
/// Wraps the core PlaybackSession with a JavaScript-friendly API and wires it
/// to an `<audio>` element, a Web Audio analyser and `requestAnimationFrame`.
#[wasm_bindgen]
pub struct WasmPlaybackSession {
    inner: Rc<RefCell<Inner>>,
    inbox: MediaInbox,
}

#[wasm_bindgen]
impl WasmPlaybackSession {
    /// Create a session
    ///
    /// `config` is an optional `{ initial_volume, muted, loop_enabled, autoplay }`
    /// object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlaybackSession, JsValue> {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid session config: {e}")))?
        };

        let inbox = MediaInbox::new();
        let backend = WebAudioBackend::new(inbox.clone());

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Inner>>| {
            let weak = weak.clone();
            let scheduler = AnimationFrameScheduler::new(move |binding| {
                if let Some(inner) = weak.upgrade() {
                    frame(&inner, binding);
                }
            });

            RefCell::new(Inner {
                session: PlaybackSession::new(config, Box::new(backend))
                    .with_scheduler(Box::new(scheduler)),
                callbacks: Callbacks::default(),
            })
        });

        let weak = Rc::downgrade(&inner);
        inbox.set_waker(move |inbox| {
            if let Some(inner) = weak.upgrade() {
                pump(&inner, inbox);
            }
        });

        Ok(Self { inner, inbox })
    }

    // ===== Track Binding =====

    /// Bind a track object (`{ id, title, artist, preview, ... }`), or
    /// release the current one with `null`
    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&mut self, track: JsValue) -> Result<(), JsValue> {
        let track: Option<Track> = if track.is_undefined() || track.is_null() {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value(track)
                    .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {e}")))?,
            )
        };

        self.with_session(|s| s.select_track(track));
        Ok(())
    }

    /// Release the track, its media and its analyser
    pub fn close(&mut self) {
        self.with_session(PlaybackSession::close);
    }

    // ===== Playback Control =====

    /// Pause, resume or restart
    #[wasm_bindgen(js_name = togglePlayback)]
    pub fn toggle_playback(&mut self) {
        self.with_session(PlaybackSession::toggle_playback);
    }

    /// Seek to a fraction (0.0 - 1.0) of the clip
    pub fn seek(&mut self, fraction: f32) {
        self.with_session(|s| s.seek(fraction));
    }

    /// Set volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: f32) {
        self.with_session(|s| s.set_volume(level));
    }

    /// Toggle mute
    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.with_session(PlaybackSession::toggle_mute);
    }

    /// Toggle looping
    #[wasm_bindgen(js_name = toggleLoop)]
    pub fn toggle_loop(&mut self) {
        self.with_session(PlaybackSession::toggle_loop);
    }

    // ===== State Queries =====

    /// Current status ("idle" | "loading" | "playing" | "paused" | "ended")
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.inner.borrow().session.status().as_str().to_string()
    }

    /// Whether audio is playing
    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.borrow().session.is_playing()
    }

    /// Elapsed time in seconds
    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> f64 {
        self.inner.borrow().session.elapsed().as_secs_f64()
    }

    /// Clip duration in seconds, once known
    #[wasm_bindgen(js_name = getDuration)]
    pub fn get_duration(&self) -> Option<f64> {
        self.inner
            .borrow()
            .session
            .duration()
            .map(|d| d.as_secs_f64())
    }

    /// Stored volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = getVolume)]
    pub fn get_volume(&self) -> f32 {
        self.inner.borrow().session.volume()
    }

    /// Check if muted
    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.inner.borrow().session.is_muted()
    }

    /// Check if looping
    #[wasm_bindgen(js_name = isLoopEnabled)]
    pub fn is_loop_enabled(&self) -> bool {
        self.inner.borrow().session.is_loop_enabled()
    }

    /// Latest spectrum frame
    #[wasm_bindgen(js_name = getSpectrum)]
    pub fn get_spectrum(&self) -> Float32Array {
        Float32Array::from(self.inner.borrow().session.spectrum())
    }

    /// Full state snapshot as a plain object
    pub fn snapshot(&self) -> JsValue {
        let snapshot = self.inner.borrow().session.snapshot();
        serde_wasm_bindgen::to_value(&snapshot).unwrap_or(JsValue::NULL)
    }

    /// Format seconds as `m:ss`
    #[wasm_bindgen(js_name = formatTime)]
    pub fn format_time(seconds: f64) -> String {
        crate::format_time(crate::events::duration_from_secs(seconds).unwrap_or_default())
    }

    // ===== Event Listeners =====

    /// Register status change callback `(state: string)`
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&mut self, callback: Function) {
        self.inner.borrow_mut().callbacks.on_state_change = Some(callback);
    }

    /// Register position callback `(elapsed: number, duration: number)`
    #[wasm_bindgen(js_name = onPositionChange)]
    pub fn on_position_change(&mut self, callback: Function) {
        self.inner.borrow_mut().callbacks.on_position = Some(callback);
    }

    /// Register volume callback `(level: number, muted: boolean)`
    #[wasm_bindgen(js_name = onVolumeChange)]
    pub fn on_volume_change(&mut self, callback: Function) {
        self.inner.borrow_mut().callbacks.on_volume_change = Some(callback);
    }

    /// Register loop callback `(enabled: boolean)`
    #[wasm_bindgen(js_name = onLoopChange)]
    pub fn on_loop_change(&mut self, callback: Function) {
        self.inner.borrow_mut().callbacks.on_loop_change = Some(callback);
    }

    /// Register per-frame spectrum callback `(bins: Float32Array)`
    #[wasm_bindgen(js_name = onSpectrum)]
    pub fn on_spectrum(&mut self, callback: Function) {
        self.inner.borrow_mut().callbacks.on_spectrum = Some(callback);
    }

    /// Register end-of-clip callback `(trackId: string)`
    #[wasm_bindgen(js_name = onTrackFinished)]
    pub fn on_track_finished(&mut self, callback: Function) {
        self.inner.borrow_mut().callbacks.on_track_finished = Some(callback);
    }

    /// Register fault callback `({ kind, reason? })`
    #[wasm_bindgen(js_name = onFault)]
    pub fn on_fault(&mut self, callback: Function) {
        self.inner.borrow_mut().callbacks.on_fault = Some(callback);
    }

    // ===== Internal =====

    fn with_session(&mut self, op: impl FnOnce(&mut PlaybackSession)) {
        let (events, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            op(&mut inner.session);
            inner.take_events()
        };
        callbacks.dispatch(events);
        // Events queued while the session was borrowed
        pump(&self.inner, &self.inbox);
    }
}

/// Apply queued media events unless the session is already borrowed
fn pump(inner: &RefCell<Inner>, inbox: &MediaInbox) {
    let (events, callbacks) = {
        let Ok(mut inner) = inner.try_borrow_mut() else {
            return;
        };
        while let Some((binding, event)) = inbox.pop() {
            inner.session.handle_media_event(binding, event);
        }
        inner.take_events()
    };
    callbacks.dispatch(events);
}
