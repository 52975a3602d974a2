/// Previewer configuration
use crate::error::{PreviewError, Result};
use beats_catalog::FAVORITES_FILENAME;
use beats_core::Language;
use beats_playback::SessionConfig;
use beats_spectrum::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "beats.toml";

/// Environment variable prefix (`BEATS__SPECTRUM__FFT_SIZE=512`)
pub const ENV_PREFIX: &str = "BEATS";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreviewConfig {
    #[serde(default)]
    pub player: SessionConfig,

    #[serde(default = "default_spectrum")]
    pub spectrum: SpectrumSettings,

    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default)]
    pub interface: InterfaceSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpectrumSettings {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,

    #[serde(default = "default_smoothing")]
    pub smoothing: f32,

    #[serde(default = "default_min_db")]
    pub min_db: f32,

    #[serde(default = "default_max_db")]
    pub max_db: f32,

    /// Redraws per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Number of bars drawn
    #[serde(default = "default_bars")]
    pub bars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// JSON catalog file; the built-in songs are used when unset
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    #[serde(default = "default_favorites")]
    pub favorites: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InterfaceSettings {
    /// Prompt language (`en` or `te`)
    #[serde(default)]
    pub language: Language,
}

impl SpectrumSettings {
    pub fn analyzer(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            fft_size: self.fft_size,
            smoothing: self.smoothing,
            min_db: self.min_db,
            max_db: self.max_db,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            player: SessionConfig::default(),
            spectrum: default_spectrum(),
            library: default_library(),
            interface: InterfaceSettings::default(),
        }
    }
}

impl PreviewConfig {
    /// Load configuration from file and environment
    ///
    /// `path` overrides the default `beats.toml`; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    pub(crate) fn load_with(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                // Load from config file if it exists
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with BEATS__)
        settings = settings.add_source(env);

        let config = settings
            .build()
            .map_err(|e| PreviewError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| PreviewError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.initial_volume) {
            return Err(PreviewError::Config(format!(
                "player.initial_volume must be between 0.0 and 1.0, got {}",
                self.player.initial_volume
            )));
        }

        self.spectrum.analyzer().validate()?;

        if !(1..=240).contains(&self.spectrum.frame_rate) {
            return Err(PreviewError::Config(format!(
                "spectrum.frame_rate must be between 1 and 240, got {}",
                self.spectrum.frame_rate
            )));
        }

        if self.spectrum.bars == 0 || self.spectrum.bars > self.spectrum.fft_size / 2 {
            return Err(PreviewError::Config(format!(
                "spectrum.bars must be between 1 and {}, got {}",
                self.spectrum.fft_size / 2,
                self.spectrum.bars
            )));
        }

        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_spectrum() -> SpectrumSettings {
    let analyzer = AnalyzerConfig::default();
    SpectrumSettings {
        fft_size: analyzer.fft_size,
        smoothing: analyzer.smoothing,
        min_db: analyzer.min_db,
        max_db: analyzer.max_db,
        frame_rate: default_frame_rate(),
        bars: default_bars(),
    }
}

fn default_fft_size() -> usize {
    AnalyzerConfig::default().fft_size
}

fn default_smoothing() -> f32 {
    AnalyzerConfig::default().smoothing
}

fn default_min_db() -> f32 {
    AnalyzerConfig::default().min_db
}

fn default_max_db() -> f32 {
    AnalyzerConfig::default().max_db
}

fn default_frame_rate() -> u32 {
    30
}

fn default_bars() -> usize {
    32
}

fn default_library() -> LibrarySettings {
    LibrarySettings {
        catalog: None,
        favorites: default_favorites(),
    }
}

fn default_favorites() -> PathBuf {
    PathBuf::from("./data").join(FAVORITES_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn defaults_without_sources() {
        let config = PreviewConfig::load_with(None, env(&[])).unwrap();
        assert_eq!(config.player.initial_volume, 0.9);
        assert!(config.player.autoplay);
        assert_eq!(config.spectrum.fft_size, 256);
        assert_eq!(config.spectrum.bars, 32);
        assert!(config.library.catalog.is_none());
    }

    #[test]
    fn file_values_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("beats.toml");
        fs::write(
            &path,
            "[player]\nloop_enabled = true\n\n[spectrum]\nfft_size = 512\nbars = 64\n\n[interface]\nlanguage = \"te\"\n",
        )
        .unwrap();

        let config = PreviewConfig::load_with(Some(&path), env(&[])).unwrap();

        assert!(config.player.loop_enabled);
        assert_eq!(config.player.initial_volume, 0.9);
        assert_eq!(config.spectrum.fft_size, 512);
        assert_eq!(config.spectrum.bars, 64);
        assert_eq!(config.spectrum.smoothing, 0.8);
        assert_eq!(config.interface.language, Language::Telugu);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("beats.toml");
        fs::write(&path, "[spectrum]\nframe_rate = 20\n").unwrap();

        let config = PreviewConfig::load_with(
            Some(&path),
            env(&[("BEATS__SPECTRUM__FRAME_RATE", "60")]),
        )
        .unwrap();

        assert_eq!(config.spectrum.frame_rate, 60);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = PreviewConfig::load_with(Some(&dir.path().join("absent.toml")), env(&[]));
        assert!(matches!(result, Err(PreviewError::Config(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = PreviewConfig::default();
        config.spectrum.fft_size = 300;
        assert!(matches!(config.validate(), Err(PreviewError::Spectrum(_))));

        let mut config = PreviewConfig::default();
        config.spectrum.bars = 500;
        assert!(matches!(config.validate(), Err(PreviewError::Config(_))));

        let mut config = PreviewConfig::default();
        config.player.initial_volume = 1.5;
        assert!(matches!(config.validate(), Err(PreviewError::Config(_))));
    }
}
