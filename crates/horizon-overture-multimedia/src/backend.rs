//! The seam between the audio engine and the platform's media API.
//!
//! The engine never talks to an audio device directly. It opens tracks
//! through a [`MediaBackend`] and drives them through [`MediaTrack`], which
//! keeps the engine's state machine testable without hardware.

use std::time::Duration;

use crate::error::{MultimediaError, Result};

/// Progress of a track towards being playable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Still fetching or decoding.
    Pending,
    /// The whole resource is available; playback will not stall.
    Ready,
    /// The resource could not be loaded.
    Failed(MultimediaError),
}

/// One playable audio resource.
///
/// Dropping a track releases it. Implementations must stop any sound the
/// track is making when dropped.
pub trait MediaTrack {
    /// Poll load progress. Must not block.
    fn poll_load(&mut self) -> LoadStatus;

    /// Start or resume playback from the current position.
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the position.
    fn pause(&mut self);

    /// Move the playback position.
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Set the output volume (0.0 is silent).
    fn set_volume(&mut self, volume: f32);

    /// Current output volume.
    fn volume(&self) -> f32;
}

/// Opens tracks for source URIs.
pub trait MediaBackend {
    /// The track type this backend produces.
    type Track: MediaTrack;

    /// Begin loading `source`. Returns as soon as loading has started.
    fn open(&mut self, source: &str) -> Result<Self::Track>;
}
