//! The slide audio engine.
//!
//! [`AudioEngine`] owns every track it opens. It binds to the active slide's
//! [`AudioCue`], crossfades between tracks, keeps playback inside the cue's
//! loop window and holds playback back until the viewer has allowed it.
//!
//! The engine never sleeps. Fades, loop checks and load timeouts are timers
//! read against the engine's clock, and the host advances them by calling
//! [`AudioEngine::tick`] from its event loop.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_overture_core::ManualClock;
//! use horizon_overture_multimedia::{
//!     AudioCue, AudioEngine, EngineConfig, EnginePhase, LoopWindow, SimulatedBackend,
//! };
//!
//! let clock = Arc::new(ManualClock::new());
//! let backend = SimulatedBackend::new(clock.clone());
//! let mut engine = AudioEngine::with_clock(backend, EngineConfig::default(), clock.clone());
//!
//! engine.bind(Some(AudioCue::new("theme.mp3", LoopWindow::new(0.0, 10.0).unwrap())));
//! engine.request_autoplay();
//!
//! clock.advance(Duration::from_millis(100));
//! engine.tick();
//! assert_eq!(engine.phase(), EnginePhase::Playing);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use horizon_overture_core::logging::targets;
use horizon_overture_core::{SharedClock, Signal, SystemClock, TimerId, TimerManager};

use crate::backend::{LoadStatus, MediaBackend, MediaTrack};
use crate::config::EngineConfig;
use crate::cue::AudioCue;
use crate::error::MultimediaError;
use crate::fade::FadeRamp;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Nothing is bound.
    Idle,
    /// A track is loading and nothing is playing.
    Loading,
    /// A track is loaded and has not been played yet.
    Ready,
    /// The bound track is playing.
    Playing,
    /// The bound track was played and is now paused.
    Paused,
}

/// A snapshot of everything the presentation layer may show about audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStatus {
    /// Lifecycle phase.
    pub phase: EnginePhase,
    /// Whether the bound track is playing.
    pub is_playing: bool,
    /// Whether a track is loading.
    pub is_loading: bool,
    /// Whether a fade is in flight.
    pub is_transitioning: bool,
    /// Whether pressing play can do anything right now.
    pub can_play: bool,
    /// Whether the viewer has allowed playback. Never resets.
    pub has_user_granted_playback: bool,
    /// Whether autoplay has been requested. Never resets.
    pub has_autoplay_fired: bool,
    /// Whether audio is enabled at all.
    pub enabled: bool,
    /// Source of the bound track.
    pub source: Option<String>,
}

/// What a call to [`AudioEngine::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The first toggle only records that the viewer interacted.
    Armed,
    /// Playback started from the loop start.
    Started,
    /// Playback is fading out and will pause.
    Stopping,
    /// A track that failed to load is being loaded again and will play.
    Retrying,
    /// Nothing could be done (mid-fade, loading, disabled or nothing bound).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeEnd {
    Hold,
    Pause,
    Release,
}

struct Fade {
    ramp: FadeRamp,
    step: u32,
    timer: TimerId,
    end: FadeEnd,
}

/// A loaded track and what the engine knows about it.
struct Deck<T> {
    track: T,
    cue: AudioCue,
    playing: bool,
    has_played: bool,
    fade: Option<Fade>,
}

impl<T: MediaTrack> Deck<T> {
    fn owns_fade(&self, id: TimerId) -> bool {
        self.fade.as_ref().is_some_and(|fade| fade.timer == id)
    }

    fn begin_fade(&mut self, ramp: FadeRamp, end: FadeEnd, timers: &mut TimerManager) {
        if let Some(previous) = self.fade.take() {
            timers.stop(previous.timer);
        }
        let timer = timers.start_repeating(ramp.step_interval());
        self.fade = Some(Fade {
            ramp,
            step: 0,
            timer,
            end,
        });
    }

    /// Apply one fade step. Returns how the fade ends once it is complete.
    fn step_fade(&mut self, timers: &mut TimerManager) -> Option<FadeEnd> {
        let fade = self.fade.as_mut()?;
        fade.step += 1;
        self.track.set_volume(fade.ramp.volume_at(fade.step));
        if !fade.ramp.is_complete(fade.step) {
            return None;
        }
        let end = fade.end;
        timers.stop(fade.timer);
        self.fade = None;
        Some(end)
    }

    fn release(mut self, timers: &mut TimerManager) {
        if let Some(fade) = self.fade.take() {
            timers.stop(fade.timer);
        }
        self.track.pause();
        tracing::debug!(target: targets::AUDIO_ENGINE, source = %self.cue.source, "track released");
    }
}

struct PendingLoad<T> {
    track: T,
    cue: AudioCue,
    timeout: TimerId,
    ready: bool,
}

/// Plays the active slide's audio.
///
/// # Signals
///
/// - `status_changed`: emitted with a fresh [`AudioStatus`] whenever any of
///   its fields change.
/// - `position_changed`: emitted with the observed playback position on each
///   loop check that sees it move.
pub struct AudioEngine<B: MediaBackend> {
    backend: B,
    config: EngineConfig,
    timers: TimerManager,
    active: Option<Deck<B::Track>>,
    /// The previous track, fading out.
    outgoing: Option<Deck<B::Track>>,
    pending: Option<PendingLoad<B::Track>>,
    /// A bind that arrived mid-fade. Applied once the fade completes.
    queued: Option<Option<AudioCue>>,
    target: Option<AudioCue>,
    retry: Option<AudioCue>,
    start_on_ready: bool,
    autoplay_deferred: bool,
    user_granted: bool,
    autoplay_fired: bool,
    enabled: bool,
    shut_down: bool,
    loop_timer: Option<TimerId>,
    position: Duration,
    last_status: Option<AudioStatus>,
    status_changed: Signal<AudioStatus>,
    position_changed: Signal<Duration>,
}

impl<B: MediaBackend> AudioEngine<B> {
    /// Create an engine driven by the wall clock.
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self::with_clock(backend, config, Arc::new(SystemClock))
    }

    /// Create an engine whose timers run against `clock`.
    pub fn with_clock(backend: B, config: EngineConfig, clock: SharedClock) -> Self {
        Self {
            backend,
            config,
            timers: TimerManager::with_clock(clock),
            active: None,
            outgoing: None,
            pending: None,
            queued: None,
            target: None,
            retry: None,
            start_on_ready: false,
            autoplay_deferred: false,
            user_granted: false,
            autoplay_fired: false,
            enabled: true,
            shut_down: false,
            loop_timer: None,
            position: Duration::ZERO,
            last_status: None,
            status_changed: Signal::new(),
            position_changed: Signal::new(),
        }
    }

    /// The media backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The engine's tuning.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Signal emitted when the status changes.
    pub fn status_changed(&self) -> &Signal<AudioStatus> {
        &self.status_changed
    }

    /// Signal emitted when the observed playback position moves.
    pub fn position_changed(&self) -> &Signal<Duration> {
        &self.position_changed
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Current lifecycle phase.
    pub fn phase(&self) -> EnginePhase {
        match &self.active {
            Some(deck) if deck.playing => EnginePhase::Playing,
            _ if self.pending.is_some() => EnginePhase::Loading,
            Some(deck) if deck.has_played => EnginePhase::Paused,
            Some(_) => EnginePhase::Ready,
            None => EnginePhase::Idle,
        }
    }

    /// Whether the bound track is playing.
    pub fn is_playing(&self) -> bool {
        self.active.as_ref().is_some_and(|deck| deck.playing)
    }

    /// Whether a track is loading.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a fade is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.active.as_ref().is_some_and(|deck| deck.fade.is_some()) || self.outgoing.is_some()
    }

    /// Whether a cue is bound, nothing is loading and audio is enabled.
    pub fn can_play(&self) -> bool {
        !self.shut_down && self.enabled && self.target.is_some() && self.pending.is_none()
    }

    /// Whether audio is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the viewer has allowed playback.
    pub fn has_user_granted_playback(&self) -> bool {
        self.user_granted
    }

    /// The cue of the bound track, if a track is bound.
    pub fn current_cue(&self) -> Option<&AudioCue> {
        self.active.as_ref().map(|deck| &deck.cue)
    }

    /// Last observed playback position.
    pub fn position(&self) -> Duration {
        self.position
    }

    /// A snapshot of the observable state.
    pub fn status(&self) -> AudioStatus {
        AudioStatus {
            phase: self.phase(),
            is_playing: self.is_playing(),
            is_loading: self.is_loading(),
            is_transitioning: self.is_transitioning(),
            can_play: self.can_play(),
            has_user_granted_playback: self.user_granted,
            has_autoplay_fired: self.autoplay_fired,
            enabled: self.enabled,
            source: self.active.as_ref().map(|deck| deck.cue.source.clone()),
        }
    }

    /// Time until the next fade step, loop check or timeout is due.
    pub fn time_until_next_timer(&mut self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Bind the active slide's cue, or `None` for a silent slide.
    ///
    /// Binding the source that is already bound (or loading) does nothing.
    /// While a fade is in flight the bind is held and applied when the fade
    /// completes; a later bind replaces a held one.
    pub fn bind(&mut self, cue: Option<AudioCue>) {
        if self.shut_down {
            return;
        }
        let same_target = match (&cue, &self.target) {
            (Some(new), Some(old)) => new.same_source(old),
            (None, None) => true,
            _ => false,
        };
        if !same_target {
            self.retry = None;
        }
        self.target = cue.clone();
        if self.enabled {
            self.apply_bind(cue);
        }
        self.publish();
    }

    /// Play or pause.
    ///
    /// The first call only records that the viewer interacted. Later calls
    /// pause a playing track (fading out, then rewinding to zero) or start a
    /// loaded one from its loop start. Calls made while a fade is in flight
    /// are ignored.
    pub fn toggle(&mut self) -> ToggleOutcome {
        if self.shut_down {
            return ToggleOutcome::Ignored;
        }
        let outcome = self.toggle_inner();
        tracing::debug!(target: targets::AUDIO_ENGINE, ?outcome, "toggle");
        self.publish();
        outcome
    }

    fn toggle_inner(&mut self) -> ToggleOutcome {
        if !self.user_granted {
            self.user_granted = true;
            return ToggleOutcome::Armed;
        }
        if !self.enabled || self.is_transitioning() {
            return ToggleOutcome::Ignored;
        }
        if self.is_playing() {
            self.begin_stop();
            return ToggleOutcome::Stopping;
        }
        if self.pending.is_some() {
            return ToggleOutcome::Ignored;
        }
        if self.active.is_some() {
            return if self.start_playback() {
                ToggleOutcome::Started
            } else {
                ToggleOutcome::Ignored
            };
        }
        match self.retry.take() {
            Some(cue) => {
                tracing::debug!(target: targets::AUDIO_ENGINE, source = %cue.source, "retrying audio");
                self.load(cue);
                if self.pending.is_some() {
                    self.start_on_ready = true;
                }
                ToggleOutcome::Retrying
            }
            None => ToggleOutcome::Ignored,
        }
    }

    /// Start playback because the viewer allowed it outside the player.
    ///
    /// Fires once per engine; later calls return `false`. Firing also grants
    /// playback. If nothing is loaded yet, playback starts as soon as the
    /// track is ready, and every later track starts on its own.
    pub fn request_autoplay(&mut self) -> bool {
        if self.shut_down || self.autoplay_fired {
            return false;
        }
        self.autoplay_fired = true;
        self.user_granted = true;

        let startable = self.enabled
            && !self.is_transitioning()
            && self.pending.is_none()
            && self.active.as_ref().is_some_and(|deck| !deck.playing);
        if startable {
            self.start_playback();
        } else {
            self.autoplay_deferred = true;
        }
        tracing::info!(target: targets::AUDIO_ENGINE, deferred = !startable, "autoplay granted");
        self.publish();
        true
    }

    /// Enable or disable audio.
    ///
    /// Disabling releases the bound track but remembers the cue; enabling
    /// binds it again.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.shut_down || self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        let cue = if enabled { self.target.clone() } else { None };
        self.apply_bind(cue);
        self.publish();
    }

    /// Advance fades, loop checks and load timeouts, and poll a pending load.
    pub fn tick(&mut self) {
        if self.shut_down {
            return;
        }
        for id in self.timers.process_expired() {
            self.on_timer(id);
        }
        self.settle();
        self.publish();
    }

    /// Pause and release every track and cancel every timer.
    ///
    /// Later calls to any operation do nothing. Dropping the engine shuts it
    /// down.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.queued = None;
        self.retry = None;
        self.pending = None;
        for deck in [self.outgoing.take(), self.active.take()].into_iter().flatten() {
            deck.release(&mut self.timers);
        }
        self.timers.clear();
        self.loop_timer = None;
        tracing::debug!(target: targets::AUDIO_ENGINE, "audio engine shut down");
        self.publish();
    }

    // =========================================================================
    // Binding
    // =========================================================================

    fn apply_bind(&mut self, cue: Option<AudioCue>) {
        if self.is_transitioning() {
            if self.queued.is_some() || !self.is_bound_to(cue.as_ref()) {
                tracing::debug!(target: targets::AUDIO_ENGINE, "bind held until fade completes");
                self.queued = Some(cue);
            }
            return;
        }
        self.queued = None;
        match cue {
            Some(cue) => self.load(cue),
            None => {
                self.drop_pending();
                self.start_on_ready = false;
                self.autoplay_deferred = false;
                if let Some(deck) = self.active.take() {
                    self.retire(deck);
                }
            }
        }
    }

    fn is_bound_to(&self, cue: Option<&AudioCue>) -> bool {
        match cue {
            None => self.active.is_none() && self.pending.is_none(),
            Some(cue) => match &self.pending {
                Some(pending) => pending.cue.same_source(cue),
                None => self.active.as_ref().is_some_and(|deck| deck.cue.same_source(cue)),
            },
        }
    }

    fn load(&mut self, cue: AudioCue) {
        if self.pending.as_ref().is_some_and(|pending| pending.cue.same_source(&cue)) {
            return;
        }
        if self.active.as_ref().is_some_and(|deck| deck.cue.same_source(&cue)) {
            self.drop_pending();
            if let Some(deck) = self.active.as_mut() {
                deck.cue = cue;
            }
            return;
        }

        self.drop_pending();
        self.start_on_ready = false;
        match self.backend.open(&cue.source) {
            Ok(track) => {
                tracing::debug!(target: targets::AUDIO_ENGINE, source = %cue.source, "loading audio");
                let timeout = self.timers.start_one_shot(self.config.load_timeout);
                self.pending = Some(PendingLoad {
                    track,
                    cue,
                    timeout,
                    ready: false,
                });
            }
            Err(err) => self.fail_load(cue, err),
        }
    }

    fn drop_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.timers.stop(pending.timeout);
            tracing::debug!(target: targets::AUDIO_ENGINE, source = %pending.cue.source, "pending load dropped");
        }
    }

    fn fail_load(&mut self, cue: AudioCue, err: MultimediaError) {
        tracing::warn!(target: targets::AUDIO_ENGINE, source = %cue.source, error = %err, "audio unavailable");
        self.start_on_ready = false;
        self.retry = Some(cue);
        if self.is_transitioning() {
            self.queued.get_or_insert(None);
        } else if let Some(deck) = self.active.take() {
            self.retire(deck);
        }
    }

    fn poll_pending(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if !pending.ready {
            match pending.track.poll_load() {
                LoadStatus::Pending => return,
                LoadStatus::Ready => {
                    pending.ready = true;
                    self.timers.stop(pending.timeout);
                    tracing::debug!(target: targets::AUDIO_ENGINE, source = %pending.cue.source, "audio ready");
                }
                LoadStatus::Failed(err) => {
                    if let Some(pending) = self.pending.take() {
                        self.timers.stop(pending.timeout);
                        let PendingLoad { track, cue, .. } = pending;
                        drop(track);
                        self.fail_load(cue, err);
                    }
                    return;
                }
            }
        }
        if !self.is_transitioning() {
            self.promote();
        }
    }

    /// Install the ready pending track, crossfading away from the old one.
    fn promote(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Some(previous) = self.active.take() {
            self.retire(previous);
        }

        let PendingLoad { mut track, cue, .. } = pending;
        track.set_volume(0.0);
        tracing::debug!(target: targets::AUDIO_ENGINE, source = %cue.source, "track installed");
        self.active = Some(Deck {
            track,
            cue,
            playing: false,
            has_played: false,
            fade: None,
        });

        let requested = std::mem::take(&mut self.start_on_ready);
        self.autoplay_deferred = false;
        if requested || (self.user_granted && self.autoplay_fired) {
            self.start_playback();
        }
    }

    /// Fade a deck out and release it, or release it at once if silent.
    fn retire(&mut self, mut deck: Deck<B::Track>) {
        self.stop_loop_timer();
        if deck.playing {
            if let Some(previous) = self.outgoing.take() {
                previous.release(&mut self.timers);
            }
            let ramp = self.config.fade_out_ramp(deck.track.volume());
            deck.begin_fade(ramp, FadeEnd::Release, &mut self.timers);
            self.outgoing = Some(deck);
        } else {
            deck.release(&mut self.timers);
        }
    }

    /// Apply held work once no fade is in flight.
    fn settle(&mut self) {
        if !self.is_transitioning() {
            if let Some(cue) = self.queued.take() {
                self.apply_bind(cue);
            }
        }
        self.poll_pending();

        if self.autoplay_deferred && !self.is_transitioning() && self.pending.is_none() {
            self.autoplay_deferred = false;
            if self.enabled && self.active.as_ref().is_some_and(|deck| !deck.playing) {
                self.start_playback();
            }
        }
    }

    // =========================================================================
    // Playback
    // =========================================================================

    fn start_playback(&mut self) -> bool {
        let Some(deck) = self.active.as_mut() else {
            return false;
        };
        deck.track.set_volume(0.0);
        let start = deck.cue.loop_window.start();
        if let Err(err) = deck.track.seek(start) {
            tracing::warn!(target: targets::AUDIO_ENGINE, source = %deck.cue.source, error = %err, "seek to loop start failed");
        }
        if let Err(err) = deck.track.play() {
            tracing::warn!(target: targets::AUDIO_ENGINE, source = %deck.cue.source, error = %err, "playback failed");
            return false;
        }
        deck.playing = true;
        deck.has_played = true;
        let ramp = self.config.fade_in_ramp(0.0);
        deck.begin_fade(ramp, FadeEnd::Hold, &mut self.timers);
        let position = deck.track.position();

        if self.loop_timer.is_none() {
            self.loop_timer = Some(self.timers.start_repeating(self.config.loop_check_interval));
        }
        self.record_position(position);
        true
    }

    fn begin_stop(&mut self) {
        if let Some(deck) = self.active.as_mut() {
            let ramp = self.config.fade_out_ramp(deck.track.volume());
            deck.begin_fade(ramp, FadeEnd::Pause, &mut self.timers);
        }
    }

    fn stop_loop_timer(&mut self) {
        if let Some(id) = self.loop_timer.take() {
            self.timers.stop(id);
        }
    }

    fn on_timer(&mut self, id: TimerId) {
        if self.loop_timer == Some(id) {
            self.check_loop();
            return;
        }

        if self.pending.as_ref().is_some_and(|pending| pending.timeout == id) {
            if let Some(pending) = self.pending.take() {
                let PendingLoad { track, cue, .. } = pending;
                drop(track);
                let err = MultimediaError::LoadTimeout(cue.source.clone());
                self.fail_load(cue, err);
            }
            return;
        }

        let active_end = match self.active.as_mut() {
            Some(deck) if deck.owns_fade(id) => deck.step_fade(&mut self.timers),
            _ => None,
        };
        if let Some(end) = active_end {
            self.finish_active_fade(end);
            return;
        }

        let outgoing_done = match self.outgoing.as_mut() {
            Some(deck) if deck.owns_fade(id) => deck.step_fade(&mut self.timers).is_some(),
            _ => false,
        };
        if outgoing_done {
            if let Some(deck) = self.outgoing.take() {
                deck.release(&mut self.timers);
            }
        }
    }

    fn finish_active_fade(&mut self, end: FadeEnd) {
        match end {
            FadeEnd::Hold => {}
            FadeEnd::Pause => {
                self.stop_loop_timer();
                if let Some(deck) = self.active.as_mut() {
                    deck.track.pause();
                    if let Err(err) = deck.track.seek(Duration::ZERO) {
                        tracing::debug!(target: targets::AUDIO_ENGINE, error = %err, "rewind after pause failed");
                    }
                    deck.playing = false;
                }
                self.record_position(Duration::ZERO);
            }
            FadeEnd::Release => {
                if let Some(deck) = self.active.take() {
                    deck.release(&mut self.timers);
                }
            }
        }
    }

    /// Keep playback inside the loop window.
    fn check_loop(&mut self) {
        let Some(deck) = self.active.as_mut().filter(|deck| deck.playing) else {
            return;
        };
        let window = deck.cue.loop_window;
        let mut position = deck.track.position();
        if window.is_exhausted_at(position) {
            match deck.track.seek(window.start()) {
                Ok(()) => {
                    tracing::trace!(target: targets::AUDIO_ENGINE, ?position, "loop window rewound");
                    position = window.start();
                }
                Err(err) => {
                    tracing::warn!(target: targets::AUDIO_ENGINE, source = %deck.cue.source, error = %err, "loop rewind failed");
                }
            }
        }
        self.record_position(position);
    }

    fn record_position(&mut self, position: Duration) {
        if self.position != position {
            self.position = position;
            self.position_changed.emit(position);
        }
    }

    fn publish(&mut self) {
        let status = self.status();
        if self.last_status.as_ref() != Some(&status) {
            tracing::trace!(target: targets::AUDIO_ENGINE, ?status, "status changed");
            self.last_status = Some(status.clone());
            self.status_changed.emit(status);
        }
    }
}

impl<B: MediaBackend> Drop for AudioEngine<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<B: MediaBackend> fmt::Debug for AudioEngine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioEngine")
            .field("status", &self.status())
            .field("position", &self.position)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::LoopWindow;
    use crate::simulated::{MediaEvent, SimulatedBackend, SimulatedProbe};
    use horizon_overture_core::ManualClock;
    use parking_lot::Mutex;

    struct Harness {
        clock: Arc<ManualClock>,
        probe: SimulatedProbe,
        engine: AudioEngine<SimulatedBackend>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new());
            let backend = SimulatedBackend::new(clock.clone());
            let probe = backend.probe();
            let engine = AudioEngine::with_clock(backend, EngineConfig::default(), clock.clone());
            Self {
                clock,
                probe,
                engine,
            }
        }

        /// Advance time in 10 ms ticks.
        fn run(&mut self, millis: u64) {
            for _ in 0..millis / 10 {
                self.clock.advance(Duration::from_millis(10));
                self.engine.tick();
            }
        }

        fn volume(&self, source: &str) -> f32 {
            self.probe.track(source).map_or(0.0, |t| t.volume)
        }

        /// Bind, allow autoplay and let the fade-in finish.
        fn playing(source: &str, start: f64, end: f64) -> Self {
            let mut h = Self::new();
            h.engine.bind(Some(cue(source, start, end)));
            h.engine.request_autoplay();
            h.run(900);
            assert_eq!(h.engine.phase(), EnginePhase::Playing);
            h
        }
    }

    fn cue(source: &str, start: f64, end: f64) -> AudioCue {
        AudioCue::new(source, LoopWindow::new(start, end).unwrap())
    }

    fn played(source: &str) -> MediaEvent {
        MediaEvent::Played(source.into())
    }

    fn opened(source: &str) -> MediaEvent {
        MediaEvent::Opened(source.into())
    }

    #[test]
    fn test_bind_loads_without_playing() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        assert_eq!(h.engine.phase(), EnginePhase::Loading);
        assert!(h.engine.is_loading());
        assert!(!h.engine.can_play());

        h.run(60);
        assert_eq!(h.engine.phase(), EnginePhase::Ready);
        assert!(h.engine.can_play());
        assert_eq!(h.engine.status().source.as_deref(), Some("x.mp3"));
        assert_eq!(h.probe.count(&played("x.mp3")), 0);
    }

    #[test]
    fn test_first_toggle_only_arms() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.run(60);

        assert_eq!(h.engine.toggle(), ToggleOutcome::Armed);
        assert!(h.engine.has_user_granted_playback());
        assert_eq!(h.probe.count(&played("x.mp3")), 0);

        assert_eq!(h.engine.toggle(), ToggleOutcome::Started);
        assert_eq!(h.probe.count(&played("x.mp3")), 1);
        assert_eq!(h.engine.phase(), EnginePhase::Playing);
        assert!(h.engine.is_transitioning());

        h.run(800);
        assert!(!h.engine.is_transitioning());
        assert!((h.volume("x.mp3") - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_ignored_mid_fade() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.run(60);
        h.engine.toggle();
        h.engine.toggle();

        assert_eq!(h.engine.toggle(), ToggleOutcome::Ignored);
        assert!(h.engine.is_playing());
    }

    #[test]
    fn test_toggle_pauses_and_rewinds() {
        let mut h = Harness::playing("x.mp3", 5.0, 20.0);
        h.run(1000);

        assert_eq!(h.engine.toggle(), ToggleOutcome::Stopping);
        assert!(h.engine.is_playing());
        h.run(600);

        assert_eq!(h.engine.phase(), EnginePhase::Paused);
        assert_eq!(h.engine.position(), Duration::ZERO);
        let track = h.probe.track("x.mp3").unwrap();
        assert!(!track.playing);
        assert_eq!(track.position, Duration::ZERO);
        assert_eq!(track.volume, 0.0);

        // Resuming starts from the loop start, not from zero.
        assert_eq!(h.engine.toggle(), ToggleOutcome::Started);
        assert_eq!(
            h.probe.count(&MediaEvent::Seeked("x.mp3".into(), Duration::from_secs(5))),
            2
        );
    }

    #[test]
    fn test_request_autoplay_fires_once() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        assert!(h.engine.request_autoplay());
        assert!(!h.engine.request_autoplay());

        h.run(1000);
        assert!(!h.engine.request_autoplay());
        assert_eq!(h.probe.count(&played("x.mp3")), 1);
        assert!(h.engine.has_user_granted_playback());
    }

    #[test]
    fn test_request_autoplay_on_loaded_track_starts_now() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.run(60);

        assert!(h.engine.request_autoplay());
        assert_eq!(h.engine.phase(), EnginePhase::Playing);
    }

    #[test]
    fn test_rebinding_same_source_keeps_position() {
        let mut h = Harness::playing("x.mp3", 0.0, 30.0);
        h.run(2000);
        let before = h.engine.position();

        h.engine.bind(Some(cue("x.mp3", 0.0, 30.0)));
        h.run(200);

        assert_eq!(h.probe.count(&opened("x.mp3")), 1);
        assert_eq!(h.probe.count(&played("x.mp3")), 1);
        assert!(h.engine.position() > before);
    }

    #[test]
    fn test_rebinding_while_loading_does_not_reopen() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.run(60);
        assert_eq!(h.probe.count(&opened("x.mp3")), 1);
    }

    #[test]
    fn test_loop_rewinds_to_exact_start() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 2.0, 3.0)));
        h.engine.request_autoplay();
        h.run(50);
        assert!(h.engine.is_playing());

        let start = Duration::from_secs(2);
        let end = Duration::from_secs(3);
        for _ in 0..500 {
            h.clock.advance(Duration::from_millis(10));
            h.engine.tick();
            let position = h.engine.position();
            assert!(position >= start && position < end, "position {position:?}");
        }

        let events = h.probe.events();
        let seeks: Vec<&Duration> = events
            .iter()
            .filter_map(|e| match e {
                MediaEvent::Seeked(_, to) => Some(to),
                _ => None,
            })
            .collect();
        assert!(seeks.len() >= 5);
        assert!(seeks.iter().all(|to| **to == start));
        assert!(h.engine.is_playing());
    }

    #[test]
    fn test_crossfade_between_sources() {
        let mut h = Harness::playing("x.mp3", 0.0, 10.0);

        h.engine.bind(Some(cue("y.mp3", 5.0, 20.0)));
        assert!(h.engine.is_loading());
        assert_eq!(h.engine.phase(), EnginePhase::Playing);

        h.run(50);
        assert_eq!(h.engine.status().source.as_deref(), Some("y.mp3"));
        assert!(h.engine.is_transitioning());
        let live: Vec<String> = h.probe.live_tracks().into_iter().map(|t| t.source).collect();
        assert_eq!(live, vec!["x.mp3".to_string(), "y.mp3".to_string()]);

        h.run(600);
        assert!(h.probe.track("x.mp3").is_none());
        assert!(h.volume("y.mp3") < 0.6);

        h.run(200);
        assert!(!h.engine.is_transitioning());
        assert!((h.volume("y.mp3") - 0.6).abs() < 1e-6);
        assert_eq!(h.probe.track("y.mp3").unwrap().position, Duration::from_millis(5800));
    }

    #[test]
    fn test_bind_during_fade_is_held() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.engine.request_autoplay();
        h.run(60);
        assert!(h.engine.is_transitioning());

        h.engine.bind(Some(cue("y.mp3", 0.0, 10.0)));
        assert_eq!(h.probe.count(&opened("y.mp3")), 0);

        h.run(800);
        assert_eq!(h.probe.count(&opened("y.mp3")), 1);
        h.run(60);
        assert_eq!(h.engine.status().source.as_deref(), Some("y.mp3"));
    }

    #[test]
    fn test_last_held_bind_wins() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.engine.request_autoplay();
        h.run(60);

        h.engine.bind(Some(cue("y.mp3", 0.0, 10.0)));
        h.engine.bind(Some(cue("z.mp3", 0.0, 10.0)));
        h.run(1000);

        assert_eq!(h.probe.count(&opened("y.mp3")), 0);
        assert_eq!(h.probe.count(&opened("z.mp3")), 1);
    }

    #[test]
    fn test_newer_bind_replaces_pending_load() {
        let mut h = Harness::new();
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.engine.bind(Some(cue("y.mp3", 0.0, 10.0)));

        assert!(h.probe.events().contains(&MediaEvent::Released("x.mp3".into())));
        h.run(60);
        assert_eq!(h.engine.status().source.as_deref(), Some("y.mp3"));
        assert_eq!(h.engine.timers.active_count(), 0);
    }

    #[test]
    fn test_unbind_goes_idle_and_releases() {
        let mut h = Harness::playing("x.mp3", 0.0, 10.0);

        h.engine.bind(None);
        assert_eq!(h.engine.phase(), EnginePhase::Idle);
        assert!(h.engine.is_transitioning());
        assert!(!h.engine.can_play());
        assert!(h.probe.track("x.mp3").is_some());

        h.run(600);
        assert!(h.probe.live_tracks().is_empty());
        assert_eq!(h.engine.timers.active_count(), 0);
    }

    #[test]
    fn test_load_timeout_then_retry() {
        let mut h = Harness::new();
        h.engine.backend().stall_source("x.mp3");
        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));

        h.run(9_990);
        assert!(h.engine.is_loading());
        h.run(10);
        assert!(!h.engine.is_loading());
        assert_eq!(h.engine.phase(), EnginePhase::Idle);
        assert!(h.engine.can_play());
        assert!(h.probe.live_tracks().is_empty());

        h.engine.backend().restore_source("x.mp3");
        assert_eq!(h.engine.toggle(), ToggleOutcome::Armed);
        assert_eq!(h.engine.toggle(), ToggleOutcome::Retrying);
        h.run(60);

        assert_eq!(h.probe.count(&opened("x.mp3")), 2);
        assert!(h.engine.is_playing());
    }

    #[test]
    fn test_load_failure_silences_previous_track() {
        let mut h = Harness::playing("x.mp3", 0.0, 10.0);
        h.engine.backend().fail_source("bad.mp3");

        h.engine.bind(Some(cue("bad.mp3", 0.0, 10.0)));
        h.run(20);
        assert!(!h.engine.is_loading());
        assert!(!h.engine.is_playing());
        assert_eq!(h.engine.phase(), EnginePhase::Idle);

        h.run(600);
        assert!(h.probe.live_tracks().is_empty());
    }

    #[test]
    fn test_unbind_clears_retry() {
        let mut h = Harness::new();
        h.engine.backend().fail_source("bad.mp3");
        h.engine.bind(Some(cue("bad.mp3", 0.0, 10.0)));
        h.run(20);
        h.engine.bind(None);

        h.engine.toggle();
        assert_eq!(h.engine.toggle(), ToggleOutcome::Ignored);
        assert_eq!(h.probe.count(&opened("bad.mp3")), 1);
    }

    #[test]
    fn test_disable_and_reenable() {
        let mut h = Harness::playing("x.mp3", 0.0, 10.0);

        h.engine.set_enabled(false);
        assert!(!h.engine.can_play());
        assert_eq!(h.engine.phase(), EnginePhase::Idle);
        assert_eq!(h.engine.toggle(), ToggleOutcome::Ignored);
        h.run(600);
        assert!(h.probe.live_tracks().is_empty());

        // Binds while disabled are remembered.
        h.engine.bind(Some(cue("y.mp3", 0.0, 10.0)));
        assert_eq!(h.probe.count(&opened("y.mp3")), 0);

        h.engine.set_enabled(true);
        h.run(900);
        assert_eq!(h.probe.count(&opened("y.mp3")), 1);
        assert!(h.engine.is_playing());
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut h = Harness::playing("x.mp3", 0.0, 10.0);
        h.engine.bind(Some(cue("y.mp3", 0.0, 10.0)));

        h.engine.shutdown();
        assert!(h.probe.live_tracks().is_empty());
        assert_eq!(h.engine.timers.active_count(), 0);
        assert_eq!(h.engine.phase(), EnginePhase::Idle);

        h.engine.bind(Some(cue("z.mp3", 0.0, 10.0)));
        assert_eq!(h.engine.toggle(), ToggleOutcome::Ignored);
        assert_eq!(h.probe.count(&opened("z.mp3")), 0);
    }

    #[test]
    fn test_drop_releases_mid_crossfade() {
        let mut h = Harness::playing("x.mp3", 0.0, 10.0);
        h.engine.bind(Some(cue("y.mp3", 0.0, 10.0)));
        h.run(100);
        assert_eq!(h.probe.live_tracks().len(), 2);

        let Harness { probe, engine, .. } = h;
        drop(engine);
        assert!(probe.live_tracks().is_empty());
    }

    #[test]
    fn test_status_signal() {
        let mut h = Harness::new();
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = phases.clone();
        h.engine.status_changed().connect(move |status: &AudioStatus| {
            sink.lock().push(status.phase);
        });

        h.engine.bind(Some(cue("x.mp3", 0.0, 10.0)));
        h.run(100);

        let phases = phases.lock();
        assert_eq!(phases.first(), Some(&EnginePhase::Loading));
        assert_eq!(phases.last(), Some(&EnginePhase::Ready));
    }
}
