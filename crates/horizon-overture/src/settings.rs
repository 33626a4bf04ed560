//! Presentation settings loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ```toml
//! [audio]
//! enabled = true
//! fade_in_ms = 800
//! fade_out_ms = 600
//! target_volume = 0.6
//! base_dir = "public"
//!
//! [gestures]
//! swipe_min_distance = 50.0
//! swipe_min_velocity = 300.0
//!
//! [navigation]
//! mode = "scroll"
//!
//! [source]
//! location = "https://example.com/data.json"
//! http_timeout_ms = 30000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use horizon_overture_multimedia::EngineConfig;

use crate::error::{Result as DeckResult, SettingsError};
use crate::gesture::{DEFAULT_SWIPE_MIN_DISTANCE, DEFAULT_SWIPE_MIN_VELOCITY, SwipeConfig};
use crate::navigation::NavigationMode;
use crate::source::{ConfiguredSource, DEFAULT_HTTP_TIMEOUT};

/// `[audio]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioSettings {
    /// Whether background audio plays at all.
    pub enabled: bool,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    pub fade_steps: u32,
    /// Volume a fade-in ends at, in `(0, 1]`.
    pub target_volume: f32,
    pub loop_check_interval_ms: u64,
    pub load_timeout_ms: u64,
    /// Directory relative audio paths resolve against.
    pub base_dir: Option<PathBuf>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            enabled: true,
            fade_in_ms: engine.fade_in.as_millis() as u64,
            fade_out_ms: engine.fade_out.as_millis() as u64,
            fade_steps: engine.fade_steps,
            target_volume: engine.target_volume,
            loop_check_interval_ms: engine.loop_check_interval.as_millis() as u64,
            load_timeout_ms: engine.load_timeout.as_millis() as u64,
            base_dir: None,
        }
    }
}

/// `[gestures]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureSettings {
    pub swipe_min_distance: f32,
    pub swipe_min_velocity: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            swipe_min_distance: DEFAULT_SWIPE_MIN_DISTANCE,
            swipe_min_velocity: DEFAULT_SWIPE_MIN_VELOCITY,
        }
    }
}

/// `[navigation]` table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationSettings {
    pub mode: NavigationMode,
}

/// `[source]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    /// A file path or an `http(s)://` URL.
    pub location: String,
    pub http_timeout_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            location: "data.json".to_string(),
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT.as_millis() as u64,
        }
    }
}

/// All presentation settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub audio: AudioSettings,
    pub gestures: GestureSettings,
    pub navigation: NavigationSettings,
    pub source: SourceSettings,
}

impl Settings {
    /// Read and validate a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let audio = &self.audio;
        if audio.fade_steps == 0 {
            return Err(SettingsError::invalid_value("audio.fade_steps", "must be at least 1"));
        }
        if !(audio.target_volume > 0.0 && audio.target_volume <= 1.0) {
            return Err(SettingsError::invalid_value(
                "audio.target_volume",
                format!("{} is outside (0, 1]", audio.target_volume),
            ));
        }
        if audio.loop_check_interval_ms == 0 {
            return Err(SettingsError::invalid_value(
                "audio.loop_check_interval_ms",
                "must be at least 1",
            ));
        }
        if audio.load_timeout_ms == 0 {
            return Err(SettingsError::invalid_value("audio.load_timeout_ms", "must be at least 1"));
        }

        let gestures = &self.gestures;
        for (key, value) in [
            ("gestures.swipe_min_distance", gestures.swipe_min_distance),
            ("gestures.swipe_min_velocity", gestures.swipe_min_velocity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::invalid_value(key, format!("{value} is not a non-negative number")));
            }
        }

        if self.source.location.trim().is_empty() {
            return Err(SettingsError::invalid_value("source.location", "must not be empty"));
        }
        Ok(())
    }

    /// Audio engine parameters.
    pub fn engine_config(&self) -> EngineConfig {
        let audio = &self.audio;
        EngineConfig {
            fade_in: Duration::from_millis(audio.fade_in_ms),
            fade_out: Duration::from_millis(audio.fade_out_ms),
            fade_steps: audio.fade_steps,
            target_volume: audio.target_volume,
            loop_check_interval: Duration::from_millis(audio.loop_check_interval_ms),
            load_timeout: Duration::from_millis(audio.load_timeout_ms),
        }
    }

    /// Swipe thresholds.
    pub fn swipe_config(&self) -> SwipeConfig {
        SwipeConfig {
            min_distance: self.gestures.swipe_min_distance,
            min_velocity: self.gestures.swipe_min_velocity,
        }
    }

    /// The deck source named by `[source]`.
    pub fn source(&self) -> DeckResult<ConfiguredSource> {
        ConfiguredSource::from_location(
            &self.source.location,
            Duration::from_millis(self.source.http_timeout_ms),
        )
    }
}
