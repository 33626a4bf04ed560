//! Multimedia module for Horizon Overture.
//!
//! This crate plays the background audio of a presentation:
//!
//! - **Audio Engine**: binds to the active slide's cue, crossfades between
//!   tracks, loops inside a window and gates playback on viewer permission
//! - **Media Backends**: a `rodio` backend for real output and a clock-driven
//!   simulated backend for tests and headless hosts
//!
//! # Audio Engine
//!
//! ```ignore
//! use horizon_overture_multimedia::{AudioCue, AudioEngine, EngineConfig, LoopWindow, RodioBackend};
//!
//! let backend = RodioBackend::new()?;
//! let mut engine = AudioEngine::new(backend, EngineConfig::default());
//!
//! // Follow the engine from the presentation layer
//! engine.status_changed().connect(|status| {
//!     println!("audio: {:?}", status.phase);
//! });
//!
//! // Bind the active slide's cue, then let the viewer allow playback
//! engine.bind(Some(AudioCue::new("audio/theme.mp3", LoopWindow::new(0.0, 42.5)?)));
//! engine.request_autoplay();
//!
//! // From the host's event loop
//! loop {
//!     engine.tick();
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! ```
//!
//! ## Supported Formats
//!
//! - WAV
//! - MP3
//! - OGG Vorbis
//! - FLAC
//! - AAC/M4A (via Symphonia backend)

mod backend;
mod config;
mod cue;
mod engine;
mod error;
mod fade;
mod rodio_backend;
mod simulated;

pub use error::{MultimediaError, Result};

// Re-export commonly used types at the crate root
pub use backend::{LoadStatus, MediaBackend, MediaTrack};
pub use config::EngineConfig;
pub use cue::{AudioCue, LoopWindow, LoopWindowError};
pub use engine::{AudioEngine, AudioStatus, EnginePhase, ToggleOutcome};
pub use fade::FadeRamp;
pub use rodio_backend::{RodioBackend, RodioTrack};
pub use simulated::{MediaEvent, SimulatedBackend, SimulatedProbe, SimulatedTrack, TrackSnapshot};
