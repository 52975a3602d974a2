//! Preview clip decoding
//!
//! Clips are short, so the whole file is decoded up front into mono `f32`
//! samples. The deck plays from memory and the analyzer taps the same buffer.

use crate::error::{PreviewError, Result};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Fully decoded mono clip
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedClip {
    /// Wrap already decoded mono samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Decode an audio file, downmixing all channels
    pub fn decode(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PreviewError::Decode(format!("failed to probe {}: {e}", path.display())))?;

        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| PreviewError::Decode("no audio tracks found".to_string()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PreviewError::Decode(format!("failed to create decoder: {e}")))?;

        let mut samples = Vec::new();
        let mut buffer: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(PreviewError::Decode(format!("error reading packet: {e}"))),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!("skipping undecodable packet: {e}");
                    continue;
                }
                Err(e) => return Err(PreviewError::Decode(e.to_string())),
            };

            let spec = *decoded.spec();
            sample_rate = spec.rate;
            let channels = spec.channels.count().max(1);

            let needed = decoded.capacity() * channels;
            if buffer.as_ref().map_or(true, |buf| buf.capacity() < needed) {
                buffer = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
            }
            let Some(buf) = buffer.as_mut() else {
                continue;
            };
            buf.copy_interleaved_ref(decoded);

            samples.extend(
                buf.samples()
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }

        tracing::debug!(
            path = %path.display(),
            sample_rate,
            frames = samples.len(),
            "clip decoded"
        );

        Ok(Self::new(samples, sample_rate))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Clip length
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// Sample index of `position`, clamped to the clip
    pub fn index_at(&self, position: Duration) -> usize {
        let index = (position.as_secs_f64() * f64::from(self.sample_rate)) as usize;
        index.min(self.samples.len())
    }

    /// Samples ending at `position`, at most `len` of them
    pub fn window_before(&self, position: Duration, len: usize) -> &[f32] {
        let end = self.index_at(position);
        &self.samples[end.saturating_sub(len)..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_from_sample_count() {
        let clip = DecodedClip::new(vec![0.0; 8000], 4000);
        assert_eq!(clip.duration(), Duration::from_secs(2));
    }

    #[test]
    fn window_is_clamped() {
        let clip = DecodedClip::new((0..10).map(|i| i as f32).collect(), 10);

        assert!(clip.window_before(Duration::ZERO, 4).is_empty());
        assert_eq!(clip.window_before(Duration::from_millis(500), 3), &[2.0, 3.0, 4.0]);
        assert_eq!(clip.window_before(Duration::from_millis(200), 8), &[0.0, 1.0]);
        assert_eq!(clip.window_before(Duration::from_secs(5), 2), &[8.0, 9.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = DecodedClip::decode(Path::new("/nonexistent/clip.wav"));
        assert!(matches!(result, Err(PreviewError::Io(_))));
    }
}
