//! Spectrum sampling task
//!
//! One task per binding. It owns the analyzer and is stopped, never paused,
//! when its binding goes away.

use crate::platform::SpectrumSource;
use crate::types::BindingId;

pub(crate) struct SamplingTask {
    binding: BindingId,
    source: Option<Box<dyn SpectrumSource>>,
    frames: u64,
}

impl SamplingTask {
    pub(crate) fn new(binding: BindingId, source: Box<dyn SpectrumSource>) -> Self {
        Self {
            binding,
            source: Some(source),
            frames: 0,
        }
    }

    pub(crate) fn binding(&self) -> BindingId {
        self.binding
    }

    /// Read one frame into `frame`, resizing it to the analyzer's bin count
    pub(crate) fn sample(&mut self, frame: &mut Vec<f32>) {
        let Some(source) = self.source.as_mut() else {
            return;
        };

        frame.resize(source.bin_count(), 0.0);
        source.read_frame(frame);
        for magnitude in frame.iter_mut() {
            *magnitude = if magnitude.is_finite() {
                magnitude.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        self.frames += 1;
    }

    /// Disconnect the analyzer; teardown failures are only logged
    pub(crate) fn stop(mut self) {
        self.disconnect();
    }

    fn disconnect(&mut self) {
        if let Some(mut source) = self.source.take() {
            if let Err(e) = source.disconnect() {
                tracing::debug!(binding = %self.binding, "ignoring analyzer teardown failure: {e}");
            }
            tracing::trace!(binding = %self.binding, frames = self.frames, "sampling stopped");
        }
    }
}

impl Drop for SamplingTask {
    fn drop(&mut self) {
        self.disconnect();
    }
}
