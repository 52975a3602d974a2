//! Frequency analyzer
//!
//! Mirrors the Web Audio `AnalyserNode` pipeline so the terminal previewer and
//! the browser draw the same bars:
//!
//! 1. Blackman window over the newest `fft_size` samples
//! 2. Forward FFT, magnitude `|X[k]| / N`
//! 3. Exponential smoothing against the previous frame
//! 4. Conversion to dB, then linear mapping of `[min_db, max_db]` onto `[0, 1]`

use crate::error::{Result, SpectrumError};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::sync::Arc;

/// Smallest FFT size accepted
pub const MIN_FFT_SIZE: usize = 32;

/// Largest FFT size accepted
pub const MAX_FFT_SIZE: usize = 32768;

/// Analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Samples per FFT, a power of two (default: 256, giving 128 bins)
    pub fft_size: usize,

    /// Weight of the previous frame, 0.0-1.0 (default: 0.8)
    pub smoothing: f32,

    /// Level mapped to 0.0 (default: -100 dB)
    pub min_db: f32,

    /// Level mapped to 1.0 (default: -30 dB)
    pub max_db: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl AnalyzerConfig {
    /// Check the settings
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(SpectrumError::InvalidFftSize(self.fft_size));
        }

        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(SpectrumError::InvalidSmoothing(self.smoothing));
        }

        if !self.min_db.is_finite() || !self.max_db.is_finite() || self.min_db >= self.max_db {
            return Err(SpectrumError::InvalidDecibelRange {
                min: self.min_db,
                max: self.max_db,
            });
        }

        Ok(())
    }

    /// Number of frequency bins produced per frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// FFT-based frequency analyzer
pub struct FrequencyAnalyzer {
    config: AnalyzerConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyzer {
    /// Create an analyzer
    ///
    /// # Errors
    /// Returns the first invalid setting found by [`AnalyzerConfig::validate`].
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        let n = config.fft_size;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            window: blackman_window(n),
            buffer: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; config.bin_count()],
            fft,
            scratch,
            config,
        })
    }

    /// Settings in use
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Samples consumed per frame
    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Bins produced per frame
    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    /// Center frequency of bin `index` at `sample_rate`
    pub fn bin_frequency(&self, index: usize, sample_rate: u32) -> f32 {
        index as f32 * sample_rate as f32 / self.config.fft_size as f32
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }

    /// Analyze the newest `fft_size` samples of `samples` into `out`
    ///
    /// Shorter input is treated as preceded by silence. `out` receives
    /// `min(out.len(), bin_count)` normalized magnitudes; any remaining
    /// entries are zeroed.
    pub fn analyze(&mut self, samples: &[f32], out: &mut [f32]) {
        let n = self.config.fft_size;
        let take = samples.len().min(n);
        let offset = n - take;
        let newest = &samples[samples.len() - take..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < offset { 0.0 } else { newest[i - offset] };
            let sample = if sample.is_finite() { sample } else { 0.0 };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let tau = self.config.smoothing;
        let scale = 1.0 / n as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.buffer) {
            let magnitude = bin.norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }
        }

        let range = self.config.max_db - self.config.min_db;
        for (slot, smoothed) in out.iter_mut().zip(&self.smoothed) {
            *slot = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                ((db - self.config.min_db) / range).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        if out.len() > self.smoothed.len() {
            out[self.smoothed.len()..].fill(0.0);
        }
    }
}

/// Blackman window (alpha = 0.16), as used by `AnalyserNode`
fn blackman_window(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;

    (0..n)
        .map(|i| {
            let x = 2.0 * PI * i as f32 / n as f32;
            A0 - A1 * x.cos() + A2 * (2.0 * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(bin: usize, n: usize, amplitude: f32) -> Vec<f32> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / n as f32).sin())
            .collect()
    }

    fn unsmoothed() -> AnalyzerConfig {
        AnalyzerConfig {
            smoothing: 0.0,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn default_config_matches_browser_analyser() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.fft_size, 256);
        assert_eq!(config.bin_count(), 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_fft_sizes() {
        for size in [0, 16, 100, 65536] {
            let config = AnalyzerConfig {
                fft_size: size,
                ..AnalyzerConfig::default()
            };
            assert_eq!(config.validate(), Err(SpectrumError::InvalidFftSize(size)));
        }
    }

    #[test]
    fn rejects_bad_smoothing_and_range() {
        let config = AnalyzerConfig {
            smoothing: 1.5,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SpectrumError::InvalidSmoothing(_))
        ));

        let config = AnalyzerConfig {
            min_db: -20.0,
            max_db: -30.0,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SpectrumError::InvalidDecibelRange { .. })
        ));
    }

    #[test]
    fn window_is_symmetric_and_tapered() {
        let window = blackman_window(256);
        assert!(window[0].abs() < 1e-6);
        assert!((window[128] - 1.0).abs() < 1e-5);
        assert!((window[10] - window[246]).abs() < 1e-5);
    }

    #[test]
    fn sine_peaks_in_its_bin() {
        let mut analyzer = FrequencyAnalyzer::new(unsmoothed()).unwrap();
        let mut out = vec![0.0; analyzer.bin_count()];

        analyzer.analyze(&sine(10, 256, 0.001), &mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(10));
        assert!(out[10] > 0.0 && out[10] < 1.0);
        assert!(out[40] < out[10]);
    }

    #[test]
    fn silence_is_all_zero() {
        let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
        let mut out = vec![1.0; 128];

        analyzer.analyze(&[0.0; 256], &mut out);

        assert!(out.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn loud_input_saturates_at_one() {
        let mut analyzer = FrequencyAnalyzer::new(unsmoothed()).unwrap();
        let mut out = vec![0.0; 128];

        analyzer.analyze(&sine(20, 256, 1.0), &mut out);

        assert_eq!(out[20], 1.0);
    }

    #[test]
    fn smoothing_carries_previous_frames() {
        let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
        let signal = sine(10, 256, 0.001);
        let mut first = vec![0.0; 128];
        let mut second = vec![0.0; 128];

        analyzer.analyze(&signal, &mut first);
        analyzer.analyze(&signal, &mut second);
        assert!(second[10] > first[10]);

        // After the signal stops the bars decay instead of dropping to zero
        let mut decay = vec![0.0; 128];
        analyzer.analyze(&[0.0; 256], &mut decay);
        assert!(decay[10] > 0.0 && decay[10] < second[10]);

        analyzer.reset();
        analyzer.analyze(&[0.0; 256], &mut decay);
        assert_eq!(decay[10], 0.0);
    }

    #[test]
    fn short_input_is_padded_and_long_output_zeroed() {
        let mut analyzer = FrequencyAnalyzer::new(unsmoothed()).unwrap();
        let mut out = vec![0.5; 200];

        analyzer.analyze(&[0.01; 64], &mut out);

        assert!(out[..128].iter().all(|m| (0.0..=1.0).contains(m)));
        assert!(out[128..].iter().all(|&m| m == 0.0));
    }

    #[test]
    fn bin_frequency() {
        let analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
        assert_eq!(analyzer.bin_frequency(1, 44_100), 44_100.0 / 256.0);
    }
}
