//! Web Audio media backend
//!
//! Each binding gets its own `<audio>` element and its own
//! `AudioContext` → `MediaElementAudioSourceNode` → `AnalyserNode` →
//! destination graph. Nothing is shared between bindings; detaching closes
//! the context.

use crate::error::{PlaybackError, Result};
use crate::events::{duration_from_secs, MediaEvent};
use crate::platform::{MediaBackend, MediaGraph, MediaHandle, SpectrumSource};
use crate::types::{BindingId, PlayRequest};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AnalyserNode, AudioContext, AudioContextState, Event, HtmlAudioElement, MediaElementAudioSourceNode};

/// Analyser FFT size (128 frequency bins)
pub const DEFAULT_FFT_SIZE: u32 = 256;

/// Analyser smoothing time constant
pub const DEFAULT_SMOOTHING: f64 = 0.8;

/// Queue of media events waiting to be applied to the session
///
/// DOM listeners and play promises push here; the owner drains it whenever
/// it is not already inside a session call. `wake` is invoked after every
/// push so the owner can drain right away.
#[derive(Clone, Default)]
pub struct MediaInbox {
    queue: Rc<RefCell<VecDeque<(BindingId, MediaEvent)>>>,
    wake: Rc<RefCell<Option<Box<dyn Fn(&MediaInbox)>>>>,
}

impl MediaInbox {
    /// Create an empty inbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the function called after each push
    pub fn set_waker(&self, wake: impl Fn(&MediaInbox) + 'static) {
        *self.wake.borrow_mut() = Some(Box::new(wake));
    }

    /// Queue an event for `binding`
    pub fn push(&self, binding: BindingId, event: MediaEvent) {
        self.queue.borrow_mut().push_back((binding, event));
        if let Some(wake) = self.wake.borrow().as_ref() {
            wake(self);
        }
    }

    /// Take the oldest queued event
    pub fn pop(&self) -> Option<(BindingId, MediaEvent)> {
        self.queue.borrow_mut().pop_front()
    }
}

/// Browser media backend
pub struct WebAudioBackend {
    inbox: MediaInbox,
    fft_size: u32,
    smoothing: f64,
}

impl WebAudioBackend {
    /// Create a backend reporting into `inbox`
    pub fn new(inbox: MediaInbox) -> Self {
        Self {
            inbox,
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
        }
    }

    /// Analyser FFT size; must be a power of two in 32..=32768
    pub fn with_fft_size(mut self, fft_size: u32) -> Self {
        self.fft_size = fft_size;
        self
    }

    /// Analyser smoothing time constant (0.0-1.0)
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing.clamp(0.0, 1.0);
        self
    }

    /// Insert an analyser between `source` and the speakers
    fn connect_analyser(
        &self,
        context: &AudioContext,
        source: &MediaElementAudioSourceNode,
    ) -> Result<AnalyserNode> {
        let analyser = context
            .create_analyser()
            .map_err(|e| analyzer_error("create analyser", &e))?;

        analyser.set_fft_size(self.fft_size);
        analyser.set_smoothing_time_constant(self.smoothing);

        source
            .connect_with_audio_node(&analyser)
            .map_err(|e| analyzer_error("connect source", &e))?;
        analyser
            .connect_with_audio_node(&context.destination())
            .map_err(|e| analyzer_error("connect destination", &e))?;
        Ok(analyser)
    }
}

impl MediaBackend for WebAudioBackend {
    fn build_graph(&mut self, binding: BindingId, uri: &str) -> Result<MediaGraph> {
        let audio = HtmlAudioElement::new_with_src(uri)
            .map_err(|e| PlaybackError::Load(js_message(&e)))?;
        // The analyser reads silence from cross-origin media without CORS
        audio.set_cross_origin(Some("anonymous"));
        audio.set_preload("auto");

        let mut media = HtmlMedia {
            binding,
            audio: audio.clone(),
            context: None,
            owned_context: None,
            inbox: self.inbox.clone(),
            listeners: Vec::new(),
        };
        media.listen()?;

        let context = match AudioContext::new() {
            Ok(context) => ShutdownGuard::new(context),
            Err(e) => {
                tracing::warn!(binding = %binding, "visualizer unavailable: {}", js_message(&e));
                return Ok(MediaGraph::without_spectrum(Box::new(media)));
            }
        };

        // Until the source exists the element still plays on its own
        let source = match context.get().create_media_element_source(&audio) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(binding = %binding, "visualizer unavailable: {}", js_message(&e));
                return Ok(MediaGraph::without_spectrum(Box::new(media)));
            }
        };

        match self.connect_analyser(context.get(), &source) {
            Ok(analyser) => {
                let context = context.disarm();
                media.context = Some(context.clone());
                let spectrum = AnalyserSpectrum {
                    bytes: vec![0; analyser.frequency_bin_count() as usize],
                    context,
                    source,
                    analyser,
                };
                Ok(MediaGraph::new(Box::new(media), Box::new(spectrum)))
            }
            Err(e) => {
                tracing::warn!(binding = %binding, "visualizer unavailable: {e}");

                // The element is captured by the context; route it straight out
                let _ = source.disconnect();
                match source.connect_with_audio_node(&context.get().destination()) {
                    Ok(_) => {
                        media.context = Some(context.get().clone());
                        media.owned_context = Some(context);
                        Ok(MediaGraph::without_spectrum(Box::new(media)))
                    }
                    Err(e) => {
                        media.detach();
                        Err(PlaybackError::Load(format!(
                            "audio output unavailable: {}",
                            js_message(&e)
                        )))
                    }
                }
            }
        }
    }
}

/// Resource released when a partially built graph is abandoned
trait Shutdown {
    fn shutdown(&self);
}

impl Shutdown for AudioContext {
    fn shutdown(&self) {
        if let Err(e) = self.close() {
            tracing::debug!("AudioContext close failed: {}", js_message(&e));
        }
    }
}

/// Shuts the wrapped resource down on drop unless disarmed
struct ShutdownGuard<T: Shutdown> {
    inner: T,
    armed: bool,
}

impl<T: Shutdown + Clone> ShutdownGuard<T> {
    fn new(inner: T) -> Self {
        Self { inner, armed: true }
    }

    fn get(&self) -> &T {
        &self.inner
    }

    /// Keep the resource alive past the guard
    fn disarm(mut self) -> T {
        self.armed = false;
        self.inner.clone()
    }
}

impl<T: Shutdown> Drop for ShutdownGuard<T> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.shutdown();
        }
    }
}

type Listener = Closure<dyn FnMut(Event)>;

struct HtmlMedia {
    binding: BindingId,
    audio: HtmlAudioElement,
    context: Option<AudioContext>,
    /// Context that no analyser closes, when the graph runs without one
    owned_context: Option<ShutdownGuard<AudioContext>>,
    inbox: MediaInbox,
    listeners: Vec<(&'static str, Listener)>,
}

impl HtmlMedia {
    fn listen(&mut self) -> Result<()> {
        let events: [(&'static str, fn(&HtmlAudioElement) -> MediaEvent); 6] = [
            ("loadedmetadata", |audio| MediaEvent::metadata_from_secs(audio.duration())),
            ("timeupdate", |audio| MediaEvent::time_from_secs(audio.current_time())),
            ("playing", |_| MediaEvent::Playing),
            ("pause", |_| MediaEvent::Paused),
            ("ended", |_| MediaEvent::Ended),
            ("error", |audio| MediaEvent::Error {
                message: audio
                    .error()
                    .map(|e| format!("media error {}: {}", e.code(), e.message()))
                    .unwrap_or_else(|| "media error".to_string()),
            }),
        ];

        for (name, to_event) in events {
            let audio = self.audio.clone();
            let inbox = self.inbox.clone();
            let binding = self.binding;
            let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                inbox.push(binding, to_event(&audio));
            });
            self.audio
                .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
                .map_err(|e| PlaybackError::Platform(js_message(&e)))?;
            self.listeners.push((name, listener));
        }
        Ok(())
    }

    fn resume_context(&self) {
        let Some(context) = self.context.as_ref() else {
            return;
        };
        if context.state() == AudioContextState::Suspended {
            if let Err(e) = context.resume() {
                tracing::debug!(binding = %self.binding, "AudioContext resume failed: {}", js_message(&e));
            }
        }
    }
}

impl MediaHandle for HtmlMedia {
    fn play(&mut self) -> Result<PlayRequest> {
        self.resume_context();

        let promise = self
            .audio
            .play()
            .map_err(|e| PlaybackError::PlayRejected(js_message(&e)))?;

        let inbox = self.inbox.clone();
        let binding = self.binding;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                inbox.push(
                    binding,
                    MediaEvent::PlaybackRejected {
                        reason: js_message(&e),
                    },
                );
            }
            // Success is reported by the "playing" listener
        });

        Ok(PlayRequest::Pending)
    }

    fn pause(&mut self) {
        if let Err(e) = self.audio.pause() {
            tracing::debug!(binding = %self.binding, "pause failed: {}", js_message(&e));
        }
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.audio.set_current_time(position.as_secs_f64());
        Ok(())
    }

    fn position(&self) -> Duration {
        duration_from_secs(self.audio.current_time()).unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        duration_from_secs(self.audio.duration())
    }

    fn set_loop(&mut self, enabled: bool) {
        self.audio.set_loop(enabled);
    }

    fn set_gain(&mut self, gain: f32) {
        self.audio.set_volume(f64::from(gain.clamp(0.0, 1.0)));
    }

    fn detach(&mut self) {
        for (name, listener) in self.listeners.drain(..) {
            let _ = self
                .audio
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
        let _ = self.audio.pause();
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
        self.context = None;
        self.owned_context = None;
    }
}

struct AnalyserSpectrum {
    context: AudioContext,
    source: MediaElementAudioSourceNode,
    analyser: AnalyserNode,
    bytes: Vec<u8>,
}

impl SpectrumSource for AnalyserSpectrum {
    fn bin_count(&self) -> usize {
        self.bytes.len()
    }

    fn read_frame(&mut self, frame: &mut [f32]) {
        self.analyser.get_byte_frequency_data(&mut self.bytes);
        for (out, byte) in frame.iter_mut().zip(&self.bytes) {
            *out = f32::from(*byte) / 255.0;
        }
    }

    fn disconnect(&mut self) -> Result<()> {
        self.source
            .disconnect()
            .map_err(|e| analyzer_error("disconnect source", &e))?;
        self.analyser
            .disconnect()
            .map_err(|e| analyzer_error("disconnect analyser", &e))?;
        self.context
            .close()
            .map_err(|e| analyzer_error("close AudioContext", &e))?;
        Ok(())
    }
}

fn analyzer_error(step: &str, value: &JsValue) -> PlaybackError {
    PlaybackError::Analyzer(format!("{step}: {}", js_message(value)))
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
