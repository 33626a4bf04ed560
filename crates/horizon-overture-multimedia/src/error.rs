//! Error types for the multimedia module.

use std::fmt;

/// Multimedia-specific errors.
///
/// None of these reach the viewer. The engine logs them and falls back to a
/// silent, non-playing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultimediaError {
    /// Failed to fetch or decode an audio resource.
    AudioLoad(String),
    /// The resource did not become playable within the load timeout.
    LoadTimeout(String),
    /// Playback error occurred.
    Playback(String),
    /// Audio device error.
    Device(String),
    /// Seek operation failed.
    Seek(String),
    /// Fetching a remote resource failed.
    Network(String),
    /// I/O error.
    Io(String),
}

impl fmt::Display for MultimediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AudioLoad(msg) => write!(f, "Failed to load audio: {msg}"),
            Self::LoadTimeout(src) => write!(f, "Timed out waiting for audio: {src}"),
            Self::Playback(msg) => write!(f, "Playback error: {msg}"),
            Self::Device(msg) => write!(f, "Audio device error: {msg}"),
            Self::Seek(msg) => write!(f, "Seek error: {msg}"),
            Self::Network(msg) => write!(f, "Network error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for MultimediaError {}

impl From<std::io::Error> for MultimediaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<rodio::StreamError> for MultimediaError {
    fn from(err: rodio::StreamError) -> Self {
        Self::Device(err.to_string())
    }
}

impl From<rodio::PlayError> for MultimediaError {
    fn from(err: rodio::PlayError) -> Self {
        Self::Playback(err.to_string())
    }
}

impl From<rodio::decoder::DecoderError> for MultimediaError {
    fn from(err: rodio::decoder::DecoderError) -> Self {
        Self::AudioLoad(err.to_string())
    }
}

impl From<rodio::source::SeekError> for MultimediaError {
    fn from(err: rodio::source::SeekError) -> Self {
        Self::Seek(err.to_string())
    }
}

impl From<reqwest::Error> for MultimediaError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// A specialized Result type for multimedia operations.
pub type Result<T> = std::result::Result<T, MultimediaError>;
