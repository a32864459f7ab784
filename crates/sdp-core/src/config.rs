//! Munging configuration
//!
//! Switches for the individual offer and answer transforms, with presets and
//! JSON loading.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which munging transforms to apply
///
/// Every transform is enabled by default. Missing keys in JSON fall back to the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MungeConfig {
    /// Opus discontinuous transmission on offers
    pub enable_dtx: bool,
    /// Prefer RED-wrapped opus on offers
    pub enable_red: bool,
    /// Prefer VP8 over H264 on offers
    pub enable_vp8: bool,
    /// Carry offered stereo opus into answers
    pub enable_stereo: bool,
}

impl Default for MungeConfig {
    fn default() -> Self {
        Self {
            enable_dtx: true,
            enable_red: true,
            enable_vp8: true,
            enable_stereo: true,
        }
    }
}

/// Munging configuration presets
#[derive(Debug, Clone, Copy)]
pub enum MungePreset {
    /// Every transform enabled
    Full,
    /// Audio transforms only, video payload order left to the engine
    AudioOnly,
    /// SDP passed through untouched
    Passthrough,
}

impl MungeConfig {
    /// Create config from preset
    pub fn from_preset(preset: MungePreset) -> Self {
        match preset {
            MungePreset::Full => Self::default(),
            MungePreset::AudioOnly => Self {
                enable_vp8: false,
                ..Default::default()
            },
            MungePreset::Passthrough => Self {
                enable_dtx: false,
                enable_red: false,
                enable_vp8: false,
                enable_stereo: false,
            },
        }
    }

    /// No transform enabled
    pub fn disabled() -> Self {
        Self::from_preset(MungePreset::Passthrough)
    }

    /// DTX, RED and stereo without the VP8 reorder
    pub fn audio_only() -> Self {
        Self::from_preset(MungePreset::AudioOnly)
    }

    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_dtx(mut self, enabled: bool) -> Self {
        self.enable_dtx = enabled;
        self
    }

    pub fn with_red(mut self, enabled: bool) -> Self {
        self.enable_red = enabled;
        self
    }

    pub fn with_vp8(mut self, enabled: bool) -> Self {
        self.enable_vp8 = enabled;
        self
    }

    pub fn with_stereo(mut self, enabled: bool) -> Self {
        self.enable_stereo = enabled;
        self
    }

    /// Whether any offer transform is enabled
    pub fn mangles_offers(&self) -> bool {
        self.enable_dtx || self.enable_red || self.enable_vp8
    }
}
