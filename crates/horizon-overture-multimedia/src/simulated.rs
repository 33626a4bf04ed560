//! A headless media backend driven by a [`Clock`](horizon_overture_core::Clock).
//!
//! Tracks become ready after a configurable delay and their position advances
//! with the clock while playing. Every call the engine makes is recorded, so
//! the backend doubles as a test double and as a silent backend for hosts
//! without an audio device.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_overture_core::ManualClock;
//! use horizon_overture_multimedia::{LoadStatus, MediaBackend, MediaTrack, SimulatedBackend};
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut backend = SimulatedBackend::new(clock.clone());
//! let mut track = backend.open("intro.mp3").unwrap();
//! assert_eq!(track.poll_load(), LoadStatus::Pending);
//!
//! clock.advance(Duration::from_millis(50));
//! assert_eq!(track.poll_load(), LoadStatus::Ready);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_overture_core::SharedClock;
use parking_lot::Mutex;

use crate::backend::{LoadStatus, MediaBackend, MediaTrack};
use crate::error::{MultimediaError, Result};

/// A call made against a simulated track.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// A track was opened for the source.
    Opened(String),
    /// Playback started.
    Played(String),
    /// Playback paused.
    Paused(String),
    /// The position was moved.
    Seeked(String, Duration),
    /// The track was dropped.
    Released(String),
}

/// Observable state of a live simulated track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    /// Source the track was opened for.
    pub source: String,
    /// Output volume.
    pub volume: f32,
    /// Whether the track is playing.
    pub playing: bool,
    /// Playback position.
    pub position: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadBehavior {
    After(Duration),
    Fail,
    Never,
}

struct TrackState {
    source: String,
    opened_at: Instant,
    behavior: LoadBehavior,
    playing_since: Option<Instant>,
    base_position: Duration,
    volume: f32,
}

impl TrackState {
    fn position(&self, now: Instant) -> Duration {
        match self.playing_since {
            Some(since) => self.base_position + now.saturating_duration_since(since),
            None => self.base_position,
        }
    }

    fn is_ready(&self, now: Instant) -> bool {
        match self.behavior {
            LoadBehavior::After(delay) => now.saturating_duration_since(self.opened_at) >= delay,
            LoadBehavior::Fail | LoadBehavior::Never => false,
        }
    }
}

#[derive(Default)]
struct SimState {
    next_id: u64,
    tracks: HashMap<u64, TrackState>,
    events: Vec<MediaEvent>,
    overrides: HashMap<String, LoadBehavior>,
}

/// Read access to everything a [`SimulatedBackend`] has done.
#[derive(Clone)]
pub struct SimulatedProbe {
    state: Arc<Mutex<SimState>>,
    clock: SharedClock,
}

impl SimulatedProbe {
    /// Every recorded call, oldest first.
    pub fn events(&self) -> Vec<MediaEvent> {
        self.state.lock().events.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// How many times `event` was recorded.
    pub fn count(&self, event: &MediaEvent) -> usize {
        self.state.lock().events.iter().filter(|e| *e == event).count()
    }

    /// Snapshots of the tracks that have not been released, in open order.
    pub fn live_tracks(&self) -> Vec<TrackSnapshot> {
        let now = self.clock.now();
        let state = self.state.lock();
        let mut ids: Vec<&u64> = state.tracks.keys().collect();
        ids.sort();
        ids.into_iter()
            .map(|id| {
                let track = &state.tracks[id];
                TrackSnapshot {
                    source: track.source.clone(),
                    volume: track.volume,
                    playing: track.playing_since.is_some(),
                    position: track.position(now),
                }
            })
            .collect()
    }

    /// The most recently opened live track for `source`.
    pub fn track(&self, source: &str) -> Option<TrackSnapshot> {
        self.live_tracks().into_iter().rev().find(|t| t.source == source)
    }
}

impl fmt::Debug for SimulatedProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SimulatedProbe")
            .field("live_tracks", &state.tracks.len())
            .field("events", &state.events.len())
            .finish()
    }
}

/// A media backend that makes no sound.
pub struct SimulatedBackend {
    state: Arc<Mutex<SimState>>,
    clock: SharedClock,
    load_delay: Duration,
}

impl SimulatedBackend {
    /// Create a backend whose tracks load in 50 ms.
    pub fn new(clock: SharedClock) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::default())),
            clock,
            load_delay: Duration::from_millis(50),
        }
    }

    /// Set how long tracks take to load.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Make every later open of `source` fail to load.
    pub fn fail_source(&self, source: impl Into<String>) {
        self.state.lock().overrides.insert(source.into(), LoadBehavior::Fail);
    }

    /// Make every later open of `source` stay pending forever.
    pub fn stall_source(&self, source: impl Into<String>) {
        self.state.lock().overrides.insert(source.into(), LoadBehavior::Never);
    }

    /// Undo [`fail_source`](Self::fail_source) or [`stall_source`](Self::stall_source).
    pub fn restore_source(&self, source: &str) {
        self.state.lock().overrides.remove(source);
    }

    /// A handle for inspecting recorded calls and live tracks.
    pub fn probe(&self) -> SimulatedProbe {
        SimulatedProbe {
            state: self.state.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl fmt::Debug for SimulatedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedBackend")
            .field("load_delay", &self.load_delay)
            .finish_non_exhaustive()
    }
}

impl MediaBackend for SimulatedBackend {
    type Track = SimulatedTrack;

    fn open(&mut self, source: &str) -> Result<SimulatedTrack> {
        let mut state = self.state.lock();
        let behavior = state
            .overrides
            .get(source)
            .copied()
            .unwrap_or(LoadBehavior::After(self.load_delay));

        let id = state.next_id;
        state.next_id += 1;
        state.tracks.insert(
            id,
            TrackState {
                source: source.to_string(),
                opened_at: self.clock.now(),
                behavior,
                playing_since: None,
                base_position: Duration::ZERO,
                volume: 0.0,
            },
        );
        state.events.push(MediaEvent::Opened(source.to_string()));

        Ok(SimulatedTrack {
            id,
            state: self.state.clone(),
            clock: self.clock.clone(),
        })
    }
}

/// A track opened by a [`SimulatedBackend`].
pub struct SimulatedTrack {
    id: u64,
    state: Arc<Mutex<SimState>>,
    clock: SharedClock,
}

impl SimulatedTrack {
    fn with_state<R>(&self, f: impl FnOnce(&mut TrackState, &mut Vec<MediaEvent>) -> R) -> Option<R> {
        let mut guard = self.state.lock();
        let SimState { tracks, events, .. } = &mut *guard;
        tracks.get_mut(&self.id).map(|track| f(track, events))
    }
}

impl MediaTrack for SimulatedTrack {
    fn poll_load(&mut self) -> LoadStatus {
        let now = self.clock.now();
        self.with_state(|track, _| match track.behavior {
            LoadBehavior::Fail => LoadStatus::Failed(MultimediaError::AudioLoad(format!(
                "{} could not be decoded",
                track.source
            ))),
            _ if track.is_ready(now) => LoadStatus::Ready,
            _ => LoadStatus::Pending,
        })
        .unwrap_or(LoadStatus::Pending)
    }

    fn play(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.with_state(|track, events| {
            if !track.is_ready(now) {
                return Err(MultimediaError::Playback(format!("{} is not loaded", track.source)));
            }
            if track.playing_since.is_none() {
                track.playing_since = Some(now);
            }
            events.push(MediaEvent::Played(track.source.clone()));
            Ok(())
        })
        .unwrap_or_else(|| Err(MultimediaError::Playback("track was released".into())))
    }

    fn pause(&mut self) {
        let now = self.clock.now();
        self.with_state(|track, events| {
            track.base_position = track.position(now);
            track.playing_since = None;
            events.push(MediaEvent::Paused(track.source.clone()));
        });
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let now = self.clock.now();
        self.with_state(|track, events| {
            track.base_position = position;
            if track.playing_since.is_some() {
                track.playing_since = Some(now);
            }
            events.push(MediaEvent::Seeked(track.source.clone(), position));
        });
        Ok(())
    }

    fn position(&self) -> Duration {
        let now = self.clock.now();
        self.with_state(|track, _| track.position(now)).unwrap_or_default()
    }

    fn set_volume(&mut self, volume: f32) {
        self.with_state(|track, _| track.volume = volume.max(0.0));
    }

    fn volume(&self) -> f32 {
        self.with_state(|track, _| track.volume).unwrap_or(0.0)
    }
}

impl Drop for SimulatedTrack {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if let Some(track) = state.tracks.remove(&self.id) {
            state.events.push(MediaEvent::Released(track.source));
        }
    }
}

impl fmt::Debug for SimulatedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedTrack").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_overture_core::ManualClock;

    fn setup() -> (Arc<ManualClock>, SimulatedBackend) {
        let clock = Arc::new(ManualClock::new());
        let backend = SimulatedBackend::new(clock.clone());
        (clock, backend)
    }

    #[test]
    fn test_position_follows_clock_while_playing() {
        let (clock, mut backend) = setup();
        let mut track = backend.open("a.mp3").unwrap();
        clock.advance(Duration::from_millis(50));
        assert_eq!(track.poll_load(), LoadStatus::Ready);

        track.play().unwrap();
        clock.advance(Duration::from_secs(2));
        assert_eq!(track.position(), Duration::from_secs(2));

        track.pause();
        clock.advance(Duration::from_secs(5));
        assert_eq!(track.position(), Duration::from_secs(2));
    }

    #[test]
    fn test_seek_while_playing() {
        let (clock, mut backend) = setup();
        let mut track = backend.open("a.mp3").unwrap();
        clock.advance(Duration::from_millis(50));
        track.play().unwrap();
        clock.advance(Duration::from_secs(3));

        track.seek(Duration::from_secs(1)).unwrap();
        clock.advance(Duration::from_millis(500));
        assert_eq!(track.position(), Duration::from_millis(1500));
    }

    #[test]
    fn test_play_before_ready_fails() {
        let (_clock, mut backend) = setup();
        let mut track = backend.open("a.mp3").unwrap();
        assert!(track.play().is_err());
    }

    #[test]
    fn test_failing_and_stalled_sources() {
        let (clock, mut backend) = setup();
        backend.fail_source("bad.mp3");
        backend.stall_source("slow.mp3");

        let mut bad = backend.open("bad.mp3").unwrap();
        let mut slow = backend.open("slow.mp3").unwrap();
        clock.advance(Duration::from_secs(60));

        assert!(matches!(bad.poll_load(), LoadStatus::Failed(_)));
        assert_eq!(slow.poll_load(), LoadStatus::Pending);
    }

    #[test]
    fn test_drop_releases_and_records() {
        let (_clock, mut backend) = setup();
        let probe = backend.probe();
        let track = backend.open("a.mp3").unwrap();
        assert_eq!(probe.live_tracks().len(), 1);

        drop(track);
        assert!(probe.live_tracks().is_empty());
        assert_eq!(
            probe.events(),
            vec![
                MediaEvent::Opened("a.mp3".into()),
                MediaEvent::Released("a.mp3".into()),
            ]
        );
    }
}
