//! Beats - Spectrum Analysis
//!
//! FFT frequency analyzer behind the player's bar visualizer, for hosts
//! without a Web Audio `AnalyserNode`.
//!
//! - [`FrequencyAnalyzer`]: windowed FFT with smoothing and dB normalization
//! - [`TapSpectrum`]: plugs an analyzer into a playback session as a
//!   [`SpectrumSource`](beats_playback::SpectrumSource)
//!
//! # Example
//!
//! ```rust
//! use beats_spectrum::{AnalyzerConfig, FrequencyAnalyzer};
//!
//! let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default())?;
//! let mut bins = vec![0.0; analyzer.bin_count()];
//!
//! analyzer.analyze(&[0.0; 256], &mut bins);
//! assert!(bins.iter().all(|&m| m == 0.0));
//! # Ok::<(), beats_spectrum::SpectrumError>(())
//! ```

mod analyzer;
mod error;
mod tap;

pub use analyzer::{AnalyzerConfig, FrequencyAnalyzer, MAX_FFT_SIZE, MIN_FFT_SIZE};
pub use error::{Result, SpectrumError};
pub use tap::{SampleTap, TapSpectrum};
