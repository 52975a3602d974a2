//! Volume control
//!
//! Volume is a linear level in `[0.0, 1.0]`, the same scale media elements
//! use. Mute is tracked separately so the level survives a mute/unmute cycle.

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to 0.0-1.0 (NaN becomes 0.0)
    pub fn new(level: f32) -> Self {
        Self {
            level: Self::sanitize(level).unwrap_or(0.0),
            muted: false,
        }
    }

    /// Set volume level, clamped to 0.0-1.0
    ///
    /// Returns `false` and leaves the level untouched for NaN input.
    pub fn set_level(&mut self, level: f32) -> bool {
        match Self::sanitize(level) {
            Some(level) => {
                self.level = level;
                true
            }
            None => false,
        }
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain the media output should use
    ///
    /// Returns 0.0 if muted, otherwise the stored level
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }

    fn sanitize(level: f32) -> Option<f32> {
        if level.is_nan() {
            None
        } else {
            Some(level.clamp(0.0, 1.0))
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.9)
    }
}
