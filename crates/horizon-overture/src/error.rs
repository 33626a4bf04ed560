//! Error types for deck loading and settings.

use std::path::PathBuf;

use horizon_overture_multimedia::LoopWindowError;

use crate::slide::SlideId;

/// Result type alias for deck operations.
pub type Result<T> = std::result::Result<T, DeckError>;

/// Why a deck could not be loaded.
///
/// Any of these leaves the navigation controller in the failed state with an
/// empty deck.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// Reading a deck file failed.
    #[error("Failed to read deck '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The deck URL could not be parsed.
    #[error("Invalid deck URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP request failed before a response arrived.
    #[error("Deck request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Deck request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The payload is not JSON or does not have the deck shape.
    #[error("Malformed deck: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two slides share an id.
    #[error("Duplicate slide id {0}")]
    DuplicateId(SlideId),

    /// A slide's audio names no source.
    #[error("Slide {0} has audio without a source")]
    MissingAudioSource(SlideId),

    /// A slide's loop window is inverted, empty or out of range.
    #[error("Slide {id} has an invalid loop window: {source}")]
    InvalidLoop {
        id: SlideId,
        #[source]
        source: LoopWindowError,
    },
}

impl DeckError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why settings could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading the settings file failed.
    #[error("Failed to read settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("Settings parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid value for setting '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl SettingsError {
    /// Create a value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
