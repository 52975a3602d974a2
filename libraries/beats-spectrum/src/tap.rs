//! Analyzer attached to a live sample stream

use crate::analyzer::{AnalyzerConfig, FrequencyAnalyzer};
use crate::error::Result;
use beats_playback::{PlaybackError, SpectrumSource};

/// Source of the most recent mono samples of playing audio
pub trait SampleTap {
    /// Fill `window` with the newest samples, oldest first
    ///
    /// Positions with no audio yet (start of clip, paused output) are left
    /// at zero by the caller's initialization.
    fn fill_latest(&mut self, window: &mut [f32]);

    /// Stop tapping; called once when the analyzer is disconnected
    fn release(&mut self) {}
}

/// [`SpectrumSource`] running a [`FrequencyAnalyzer`] over a [`SampleTap`]
pub struct TapSpectrum<T: SampleTap> {
    tap: T,
    analyzer: FrequencyAnalyzer,
    window: Vec<f32>,
    connected: bool,
}

impl<T: SampleTap> TapSpectrum<T> {
    /// Attach an analyzer to `tap`
    pub fn new(tap: T, config: AnalyzerConfig) -> Result<Self> {
        let analyzer = FrequencyAnalyzer::new(config)?;
        Ok(Self {
            window: vec![0.0; analyzer.fft_size()],
            analyzer,
            tap,
            connected: true,
        })
    }

    /// Whether the analyzer is still attached
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The underlying tap
    pub fn tap(&self) -> &T {
        &self.tap
    }
}

impl<T: SampleTap> SpectrumSource for TapSpectrum<T> {
    fn bin_count(&self) -> usize {
        self.analyzer.bin_count()
    }

    fn read_frame(&mut self, frame: &mut [f32]) {
        if !self.connected {
            frame.fill(0.0);
            return;
        }

        self.window.fill(0.0);
        self.tap.fill_latest(&mut self.window);
        self.analyzer.analyze(&self.window, frame);
    }

    fn disconnect(&mut self) -> beats_playback::Result<()> {
        if !self.connected {
            return Err(PlaybackError::Analyzer("analyzer already disconnected".into()));
        }

        self.connected = false;
        self.tap.release();
        self.analyzer.reset();
        tracing::trace!("spectrum tap released");
        Ok(())
    }
}
