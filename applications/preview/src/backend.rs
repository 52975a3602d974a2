//! In-memory media deck for the terminal
//!
//! The terminal has no media element, so [`ClipDeck`] plays decoded clips on
//! a simulated transport. The host advances the transport clock explicitly
//! and forwards the queued platform events to the session, which keeps the
//! whole pipeline deterministic.

use crate::clip::DecodedClip;
use crate::error::PreviewError;
use beats_playback::{
    BindingId, MediaBackend, MediaEvent, MediaGraph, MediaHandle, PlayRequest, PlaybackError,
};
use beats_spectrum::{AnalyzerConfig, SampleTap, TapSpectrum};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Transport {
    position: Duration,
    playing: bool,
    looping: bool,
    gain: f32,
}

#[derive(Default)]
struct DeckState {
    binding: Option<BindingId>,
    clip: Option<Rc<DecodedClip>>,
    transport: Transport,
    events: VecDeque<(BindingId, MediaEvent)>,
}

impl DeckState {
    fn is_current(&self, binding: BindingId) -> bool {
        self.binding == Some(binding)
    }

    fn push(&mut self, binding: BindingId, event: MediaEvent) {
        self.events.push_back((binding, event));
    }
}

/// [`MediaBackend`] playing decoded clips from memory
///
/// Clones share the same deck, so the host keeps one to drive the clock
/// while the session owns another.
#[derive(Clone)]
pub struct ClipDeck {
    state: Rc<RefCell<DeckState>>,
    analyzer: AnalyzerConfig,
    file_override: Option<PathBuf>,
}

impl ClipDeck {
    pub fn new(analyzer: AnalyzerConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(DeckState::default())),
            analyzer,
            file_override: None,
        }
    }

    /// Play `path` for every track instead of its preview locator
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_override = Some(path.into());
        self
    }

    /// Move the transport clock forward by `elapsed`
    ///
    /// Queues `TimeUpdate`, and `Ended` when the clip runs out with looping
    /// off. A looping clip wraps to the start instead.
    pub fn advance(&self, elapsed: Duration) {
        let mut state = self.state.borrow_mut();
        let (Some(binding), Some(clip)) = (state.binding, state.clip.clone()) else {
            return;
        };
        if !state.transport.playing {
            return;
        }

        let length = clip.duration();
        let mut position = state.transport.position + elapsed;
        let mut ended = false;

        if position >= length {
            if state.transport.looping && !length.is_zero() {
                let wrapped = position.as_secs_f64() % length.as_secs_f64();
                position = Duration::from_secs_f64(wrapped);
            } else {
                position = length;
                state.transport.playing = false;
                ended = true;
            }
        }

        state.transport.position = position;
        state.push(binding, MediaEvent::TimeUpdate { position });
        if ended {
            state.push(binding, MediaEvent::Ended);
        }
    }

    /// Take every queued platform event, oldest first
    pub fn drain_events(&self) -> Vec<(BindingId, MediaEvent)> {
        self.state.borrow_mut().events.drain(..).collect()
    }

    /// Transport position of the loaded clip
    pub fn position(&self) -> Duration {
        self.state.borrow().transport.position
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().transport.playing
    }

    pub fn gain(&self) -> f32 {
        self.state.borrow().transport.gain
    }

    /// Whether any clip is loaded
    pub fn is_loaded(&self) -> bool {
        self.state.borrow().clip.is_some()
    }

    fn resolve(&self, uri: &str) -> Result<PathBuf, PreviewError> {
        if let Some(path) = &self.file_override {
            return Ok(path.clone());
        }

        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }

        if uri.contains("://") {
            return Err(PreviewError::UnsupportedLocation(format!(
                "{uri} (pass --file to preview a local clip)"
            )));
        }

        Ok(Path::new(uri).to_path_buf())
    }

    fn spectrum(&self, binding: BindingId) -> Option<TapSpectrum<ClipTap>> {
        let tap = ClipTap {
            state: Rc::clone(&self.state),
            binding,
        };

        match TapSpectrum::new(tap, self.analyzer.clone()) {
            Ok(spectrum) => Some(spectrum),
            Err(e) => {
                tracing::warn!("spectrum unavailable: {e}");
                None
            }
        }
    }
}

impl MediaBackend for ClipDeck {
    fn build_graph(&mut self, binding: BindingId, uri: &str) -> beats_playback::Result<MediaGraph> {
        let path = self.resolve(uri)?;

        {
            let mut state = self.state.borrow_mut();
            state.binding = Some(binding);
            state.transport.position = Duration::ZERO;
            state.transport.playing = false;

            // Decode failures surface the way a media element reports them
            match DecodedClip::decode(&path) {
                Ok(clip) => {
                    let duration = clip.duration();
                    tracing::info!(path = %path.display(), ?duration, "clip loaded");
                    state.clip = Some(Rc::new(clip));
                    state.push(binding, MediaEvent::MetadataLoaded {
                        duration: Some(duration).filter(|d| !d.is_zero()),
                    });
                }
                Err(e) => {
                    state.clip = None;
                    state.push(binding, MediaEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }

        let media = Box::new(DeckMedia {
            state: Rc::clone(&self.state),
            binding,
        });

        Ok(match self.spectrum(binding) {
            Some(spectrum) => MediaGraph::new(media, Box::new(spectrum)),
            None => MediaGraph::without_spectrum(media),
        })
    }
}

/// Transport handle for one binding
struct DeckMedia {
    state: Rc<RefCell<DeckState>>,
    binding: BindingId,
}

impl MediaHandle for DeckMedia {
    fn play(&mut self) -> beats_playback::Result<PlayRequest> {
        let mut state = self.state.borrow_mut();
        if !state.is_current(self.binding) || state.clip.is_none() {
            return Err(PlaybackError::PlayRejected("no clip loaded".into()));
        }

        state.transport.playing = true;
        Ok(PlayRequest::Started)
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.is_current(self.binding) {
            state.transport.playing = false;
        }
    }

    fn seek(&mut self, position: Duration) -> beats_playback::Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.is_current(self.binding) {
            return Err(PlaybackError::InvalidSeekPosition(position));
        }

        let length = state.clip.as_ref().map_or(Duration::ZERO, |clip| clip.duration());
        state.transport.position = position.min(length);
        Ok(())
    }

    fn position(&self) -> Duration {
        let state = self.state.borrow();
        if state.is_current(self.binding) {
            state.transport.position
        } else {
            Duration::ZERO
        }
    }

    fn duration(&self) -> Option<Duration> {
        let state = self.state.borrow();
        if !state.is_current(self.binding) {
            return None;
        }
        state.clip.as_ref().map(|clip| clip.duration())
    }

    fn set_loop(&mut self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        if state.is_current(self.binding) {
            state.transport.looping = enabled;
        }
    }

    fn set_gain(&mut self, gain: f32) {
        let mut state = self.state.borrow_mut();
        if state.is_current(self.binding) {
            state.transport.gain = gain;
        }
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        let binding = self.binding;
        state.events.retain(|(owner, _)| *owner != binding);

        if state.is_current(binding) {
            state.binding = None;
            state.clip = None;
            state.transport = Transport::default();
        }
        tracing::debug!(%binding, "clip released");
    }
}

/// Feeds the analyzer with what the deck is currently outputting
pub struct ClipTap {
    state: Rc<RefCell<DeckState>>,
    binding: BindingId,
}

impl SampleTap for ClipTap {
    fn fill_latest(&mut self, window: &mut [f32]) {
        let state = self.state.borrow();
        if !state.is_current(self.binding) || !state.transport.playing {
            return;
        }
        let Some(clip) = state.clip.as_ref() else {
            return;
        };

        let gain = state.transport.gain;
        let recent = clip.window_before(state.transport.position, window.len());
        let offset = window.len() - recent.len();
        for (out, sample) in window[offset..].iter_mut().zip(recent) {
            *out = sample * gain;
        }
    }

    fn release(&mut self) {
        tracing::trace!(binding = %self.binding, "clip tap released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> ClipDeck {
        ClipDeck::new(AnalyzerConfig::default())
    }

    #[test]
    fn remote_locator_needs_a_local_file() {
        let mut deck = deck();
        let result = deck.build_graph(BindingId::new(1), "https://cdn.example/1.mp3");
        assert!(matches!(result, Err(PlaybackError::Load(_))));
        assert!(deck.drain_events().is_empty());
    }

    #[test]
    fn locator_resolution() {
        let deck = deck();
        assert_eq!(
            deck.resolve("file:///tmp/clip.wav").unwrap(),
            PathBuf::from("/tmp/clip.wav")
        );
        assert_eq!(
            deck.resolve("clips/a.mp3").unwrap(),
            PathBuf::from("clips/a.mp3")
        );

        let deck = deck.with_file("/tmp/override.wav");
        assert_eq!(
            deck.resolve("https://cdn.example/1.mp3").unwrap(),
            PathBuf::from("/tmp/override.wav")
        );
    }

    #[test]
    fn unreadable_clip_reports_error_event() {
        let mut deck = deck();
        let binding = BindingId::new(3);
        let graph = deck.build_graph(binding, "/nonexistent/clip.wav").unwrap();

        assert!(graph.spectrum.is_some());
        let events = deck.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, binding);
        assert!(matches!(events[0].1, MediaEvent::Error { .. }));
        assert!(!deck.is_loaded());
    }

    #[test]
    fn paused_deck_does_not_move() {
        let deck = deck();
        deck.advance(Duration::from_secs(1));
        assert_eq!(deck.position(), Duration::ZERO);
        assert!(deck.drain_events().is_empty());
    }
}
