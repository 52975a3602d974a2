//! Recording fakes for unit tests

use crate::error::{PlaybackError, Result};
use crate::platform::{FrameScheduler, MediaBackend, MediaGraph, MediaHandle, SpectrumSource};
use crate::types::{BindingId, PlayRequest};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MediaCall {
    Play,
    Pause,
    Seek(Duration),
    SetLoop(bool),
    SetGain(f32),
    Detach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerCall {
    Start(BindingId),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayMode {
    Started,
    Pending,
    Rejected,
}

struct BackendState {
    play_mode: PlayMode,
    fail_build: bool,
    fail_seek: bool,
    fail_disconnect: bool,
    with_spectrum: bool,
    frame: Vec<f32>,
    built: Vec<String>,
    media_logs: Vec<Vec<MediaCall>>,
    frames_read: usize,
    disconnects: usize,
}

/// Backend whose media and analyzers log into shared state
#[derive(Clone)]
pub(crate) struct FakeBackend {
    state: Rc<RefCell<BackendState>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BackendState {
                play_mode: PlayMode::Started,
                fail_build: false,
                fail_seek: false,
                fail_disconnect: false,
                with_spectrum: true,
                frame: vec![0.25; 8],
                built: Vec::new(),
                media_logs: Vec::new(),
                frames_read: 0,
                disconnects: 0,
            })),
        }
    }

    pub(crate) fn with_pending_play(self) -> Self {
        self.state.borrow_mut().play_mode = PlayMode::Pending;
        self
    }

    pub(crate) fn with_rejected_play(self) -> Self {
        self.state.borrow_mut().play_mode = PlayMode::Rejected;
        self
    }

    pub(crate) fn with_build_failure(self) -> Self {
        self.state.borrow_mut().fail_build = true;
        self
    }

    pub(crate) fn with_failing_seek(self) -> Self {
        self.state.borrow_mut().fail_seek = true;
        self
    }

    pub(crate) fn with_failing_disconnect(self) -> Self {
        self.state.borrow_mut().fail_disconnect = true;
        self
    }

    pub(crate) fn without_spectrum(self) -> Self {
        self.state.borrow_mut().with_spectrum = false;
        self
    }

    pub(crate) fn with_frame(self, frame: Vec<f32>) -> Self {
        self.state.borrow_mut().frame = frame;
        self
    }

    pub(crate) fn allow_play(&self) {
        self.state.borrow_mut().play_mode = PlayMode::Started;
    }

    pub(crate) fn built_uris(&self) -> Vec<String> {
        self.state.borrow().built.clone()
    }

    /// Calls received by the media of the `index`-th built graph
    pub(crate) fn media_calls(&self, index: usize) -> Vec<MediaCall> {
        self.state
            .borrow()
            .media_logs
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn frames_read(&self) -> usize {
        self.state.borrow().frames_read
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.state.borrow().disconnects
    }
}

impl MediaBackend for FakeBackend {
    fn build_graph(&mut self, _binding: BindingId, uri: &str) -> Result<MediaGraph> {
        let mut state = self.state.borrow_mut();
        if state.fail_build {
            return Err(PlaybackError::Load(format!("cannot open {uri}")));
        }

        state.built.push(uri.to_string());
        state.media_logs.push(Vec::new());
        let media = Box::new(FakeMedia {
            state: Rc::clone(&self.state),
            index: state.media_logs.len() - 1,
            position: Duration::ZERO,
        });

        if state.with_spectrum {
            let spectrum = Box::new(FakeSpectrum {
                state: Rc::clone(&self.state),
            });
            Ok(MediaGraph::new(media, spectrum))
        } else {
            Ok(MediaGraph::without_spectrum(media))
        }
    }
}

struct FakeMedia {
    state: Rc<RefCell<BackendState>>,
    index: usize,
    position: Duration,
}

impl FakeMedia {
    fn log(&self, call: MediaCall) {
        self.state.borrow_mut().media_logs[self.index].push(call);
    }
}

impl MediaHandle for FakeMedia {
    fn play(&mut self) -> Result<PlayRequest> {
        self.log(MediaCall::Play);
        match self.state.borrow().play_mode {
            PlayMode::Started => Ok(PlayRequest::Started),
            PlayMode::Pending => Ok(PlayRequest::Pending),
            PlayMode::Rejected => Err(PlaybackError::PlayRejected("NotAllowedError".into())),
        }
    }

    fn pause(&mut self) {
        self.log(MediaCall::Pause);
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.log(MediaCall::Seek(position));
        if self.state.borrow().fail_seek {
            return Err(PlaybackError::InvalidSeekPosition(position));
        }
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
        self.log(MediaCall::SetLoop(enabled));
    }

    fn set_gain(&mut self, gain: f32) {
        self.log(MediaCall::SetGain(gain));
    }

    fn detach(&mut self) {
        self.log(MediaCall::Detach);
    }
}

struct FakeSpectrum {
    state: Rc<RefCell<BackendState>>,
}

impl SpectrumSource for FakeSpectrum {
    fn bin_count(&self) -> usize {
        self.state.borrow().frame.len()
    }

    fn read_frame(&mut self, frame: &mut [f32]) {
        let mut state = self.state.borrow_mut();
        state.frames_read += 1;
        frame.copy_from_slice(&state.frame);
    }

    fn disconnect(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.disconnects += 1;
        if state.fail_disconnect {
            return Err(PlaybackError::Analyzer("context already closed".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingScheduler {
    calls: Rc<RefCell<Vec<SchedulerCall>>>,
}

impl RecordingScheduler {
    pub(crate) fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.borrow().clone()
    }
}

impl FrameScheduler for RecordingScheduler {
    fn start(&mut self, binding: BindingId) {
        self.calls.borrow_mut().push(SchedulerCall::Start(binding));
    }

    fn cancel(&mut self) {
        self.calls.borrow_mut().push(SchedulerCall::Cancel);
    }
}
