//! Display preferences
//!
//! Theme is tri-state: an explicit choice, or follow the system setting.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Follow the platform's color scheme
    #[default]
    System,
    /// Always light
    Light,
    /// Always dark
    Dark,
}

impl ThemePreference {
    /// Resolve to dark/light given the platform's current color scheme
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemePreference::Dark => true,
            ThemePreference::Light => false,
            ThemePreference::System => system_prefers_dark,
        }
    }

    /// Next value in the System → Light → Dark cycle
    pub fn cycle(self) -> Self {
        match self {
            ThemePreference::System => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
        }
    }
}

impl FromStr for ThemePreference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(ThemePreference::System),
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(CoreError::parse("theme", other)),
        }
    }
}

/// UI language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    /// English (`en`)
    #[default]
    #[serde(rename = "en")]
    English,
    /// Telugu (`te`)
    #[serde(rename = "te")]
    Telugu,
}

impl Language {
    /// Short language code
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Telugu => "te",
        }
    }

    /// Locale handed to speech recognition for voice search
    pub fn speech_locale(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Telugu => "te-IN",
        }
    }

    /// Placeholder text of the search box
    pub fn search_placeholder(self) -> &'static str {
        match self {
            Language::English => "Search songs, artists, or mood",
            Language::Telugu => "పాటలు, గాయకులు లేదా మూడ్ కోసం వెతకండి",
        }
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "te" | "telugu" => Ok(Language::Telugu),
            other => Err(CoreError::parse("language", other)),
        }
    }
}
