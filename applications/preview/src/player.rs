//! Headless player loop
//!
//! Drives a [`PlaybackSession`] over a [`ClipDeck`] one display frame at a
//! time: advance the clock, forward platform events, sample the analyzer,
//! draw a line.

use crate::backend::ClipDeck;
use crate::config::PreviewConfig;
use crate::error::Result;
use crate::render;
use beats_core::{Track, TrackId};
use beats_playback::{PlaybackFault, PlaybackSession, PlaybackStatus, SessionEvent};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Options for one preview run
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Local clip played in place of the track's preview locator
    pub file: Option<PathBuf>,

    /// Stop after this much playback; unbounded when `None`
    pub limit: Option<Duration>,

    /// Force looping on for this run
    pub looping: bool,

    /// Sleep between frames so the output animates at the frame rate
    pub realtime: bool,
}

/// What happened during a run
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySummary {
    pub track_id: TrackId,
    pub frames: u64,
    pub played: Duration,
    pub finished: bool,
    pub final_status: PlaybackStatus,
    pub fault: Option<PlaybackFault>,
}

pub struct Player<W: Write> {
    config: PreviewConfig,
    out: W,
}

impl<W: Write> Player<W> {
    pub fn new(config: PreviewConfig, out: W) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / self.config.spectrum.frame_rate.max(1)
    }

    /// Play `track` until it ends, the limit is reached, or it cannot play
    pub fn play(&mut self, track: Track, options: &PlayOptions) -> Result<PlaySummary> {
        let mut deck = ClipDeck::new(self.config.spectrum.analyzer());
        if let Some(file) = &options.file {
            deck = deck.with_file(file);
        }

        let mut session = PlaybackSession::new(self.config.player.clone(), Box::new(deck.clone()));
        if options.looping && !session.is_loop_enabled() {
            session.toggle_loop();
        }

        let track_id = track.id.clone();
        tracing::info!(track = %track_id, title = %track.title, "starting preview");
        writeln!(self.out, "{} - {}", track.title, track.artist)?;

        session.select_track(Some(track));
        pump(&deck, &mut session);

        // Without autoplay the clip waits paused; asking to play counts as the press
        if session.status() == PlaybackStatus::Paused && session.fault().is_none() {
            session.toggle_playback();
        }

        let period = self.frame_period();
        let mut frames = 0u64;
        let mut played = Duration::ZERO;
        let mut finished = self.log_events(&mut session);

        while !finished && session.is_playing() {
            if options.limit.is_some_and(|limit| played >= limit) {
                break;
            }

            deck.advance(period);
            played += period;
            pump(&deck, &mut session);

            let bars = match session.sampling_binding() {
                Some(binding) => session
                    .on_animation_frame(binding)
                    .map(|frame| render::bar_line(frame, self.config.spectrum.bars)),
                None => None,
            }
            .unwrap_or_else(|| render::bar_line(&[], self.config.spectrum.bars));

            writeln!(
                self.out,
                "{bars}  {}",
                render::status_line(&session.snapshot())
            )?;
            frames += 1;

            finished = self.log_events(&mut session);

            if options.realtime {
                std::thread::sleep(period);
            }
        }

        let summary = PlaySummary {
            track_id,
            frames,
            played,
            finished,
            final_status: session.status(),
            fault: session.fault().cloned(),
        };

        if let Some(fault) = &summary.fault {
            writeln!(self.out, "{fault}")?;
        }
        session.close();
        self.out.flush()?;

        tracing::info!(
            frames = summary.frames,
            played = ?summary.played,
            finished = summary.finished,
            "preview stopped"
        );
        Ok(summary)
    }

    /// Log drained session events; true once the track finished
    fn log_events(&self, session: &mut PlaybackSession) -> bool {
        let mut finished = false;
        for event in session.drain_events() {
            match &event {
                SessionEvent::TrackFinished { track_id } => {
                    tracing::info!(track = %track_id, "track finished");
                    finished = true;
                }
                SessionEvent::Fault { fault } => tracing::warn!("{fault}"),
                SessionEvent::PositionUpdate { .. } => {}
                other => tracing::debug!(?other, "session event"),
            }
        }
        finished
    }
}

/// Forward queued deck events into the session
fn pump(deck: &ClipDeck, session: &mut PlaybackSession) {
    for (binding, event) in deck.drain_events() {
        session.handle_media_event(binding, event);
    }
}
