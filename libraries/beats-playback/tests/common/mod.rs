//! Shared test doubles for the session integration tests
//!
//! Every fake writes into one shared journal so tests can assert on the
//! order of platform calls across bindings.

#![allow(dead_code)]

use beats_core::Track;
use beats_playback::{
    BindingId, FrameScheduler, MediaBackend, MediaGraph, MediaHandle, PlayRequest,
    PlaybackError, Result, SpectrumSource,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// One platform call, tagged with the binding that received it
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Build(BindingId, String),
    Play(BindingId),
    Pause(BindingId),
    Seek(BindingId, Duration),
    SetLoop(BindingId, bool),
    SetGain(BindingId, f32),
    Detach(BindingId),
    ReadFrame(BindingId),
    Disconnect(BindingId),
    FramesStarted(BindingId),
    FramesCancelled,
}

/// How `play()` answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAnswer {
    Immediately,
    Later,
    Refuse,
}

#[derive(Debug)]
struct Shared {
    journal: Vec<Call>,
    answer: PlayAnswer,
    level: f32,
    unreachable: Vec<String>,
}

/// Backend and scheduler sharing one call journal
#[derive(Clone)]
pub struct Rig {
    shared: Rc<RefCell<Shared>>,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                journal: Vec::new(),
                answer: PlayAnswer::Immediately,
                level: 0.5,
                unreachable: Vec::new(),
            })),
        }
    }

    pub fn answer_play(&self, answer: PlayAnswer) {
        self.shared.borrow_mut().answer = answer;
    }

    /// Magnitude every analyzer reports in all bins
    pub fn set_level(&self, level: f32) {
        self.shared.borrow_mut().level = level;
    }

    /// Make `build_graph` fail for this uri
    pub fn make_unreachable(&self, uri: &str) {
        self.shared.borrow_mut().unreachable.push(uri.to_string());
    }

    pub fn backend(&self) -> Box<dyn MediaBackend> {
        Box::new(self.clone())
    }

    pub fn scheduler(&self) -> Box<dyn FrameScheduler> {
        Box::new(self.clone())
    }

    pub fn journal(&self) -> Vec<Call> {
        self.shared.borrow().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.shared.borrow_mut().journal.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.shared.borrow().journal.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.shared.borrow_mut().journal.push(call);
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaBackend for Rig {
    fn build_graph(&mut self, binding: BindingId, uri: &str) -> Result<MediaGraph> {
        self.record(Call::Build(binding, uri.to_string()));
        if self.shared.borrow().unreachable.iter().any(|u| u == uri) {
            return Err(PlaybackError::Load(format!("404 for {uri}")));
        }

        let media = RigMedia {
            rig: self.clone(),
            binding,
            position: Duration::ZERO,
        };
        let spectrum = RigSpectrum {
            rig: self.clone(),
            binding,
        };
        Ok(MediaGraph::new(Box::new(media), Box::new(spectrum)))
    }
}

impl FrameScheduler for Rig {
    fn start(&mut self, binding: BindingId) {
        self.record(Call::FramesStarted(binding));
    }

    fn cancel(&mut self) {
        self.record(Call::FramesCancelled);
    }
}

struct RigMedia {
    rig: Rig,
    binding: BindingId,
    position: Duration,
}

impl MediaHandle for RigMedia {
    fn play(&mut self) -> Result<PlayRequest> {
        self.rig.record(Call::Play(self.binding));
        let answer = self.rig.shared.borrow().answer;
        match answer {
            PlayAnswer::Immediately => Ok(PlayRequest::Started),
            PlayAnswer::Later => Ok(PlayRequest::Pending),
            PlayAnswer::Refuse => Err(PlaybackError::PlayRejected(
                "play() failed because the user didn't interact with the document first".into(),
            )),
        }
    }

    fn pause(&mut self) {
        self.rig.record(Call::Pause(self.binding));
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.rig.record(Call::Seek(self.binding, position));
        self.position = position;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        None
    }

    fn set_loop(&mut self, enabled: bool) {
        self.rig.record(Call::SetLoop(self.binding, enabled));
    }

    fn set_gain(&mut self, gain: f32) {
        self.rig.record(Call::SetGain(self.binding, gain));
    }

    fn detach(&mut self) {
        self.rig.record(Call::Detach(self.binding));
    }
}

struct RigSpectrum {
    rig: Rig,
    binding: BindingId,
}

impl SpectrumSource for RigSpectrum {
    fn bin_count(&self) -> usize {
        128
    }

    fn read_frame(&mut self, frame: &mut [f32]) {
        self.rig.record(Call::ReadFrame(self.binding));
        let level = self.rig.shared.borrow().level;
        frame.fill(level);
    }

    fn disconnect(&mut self) -> Result<()> {
        self.rig.record(Call::Disconnect(self.binding));
        Ok(())
    }
}

// ===== Fixtures =====

pub fn track(id: &str) -> Track {
    Track::new(id, format!("Song {id}"), "Artist").with_preview(preview_uri(id))
}

pub fn silent_track(id: &str) -> Track {
    Track::new(id, format!("Song {id}"), "Artist")
}

pub fn preview_uri(id: &str) -> String {
    format!("https://cdn.example/{id}.mp3")
}
