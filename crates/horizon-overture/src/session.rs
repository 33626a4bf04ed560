//! The presentation session.
//!
//! [`Presentation`] composes the navigation controller and the audio engine.
//! The host owns it, forwards every [`InputEvent`] to
//! [`handle_input`](Presentation::handle_input) and calls
//! [`tick`](Presentation::tick) on a regular cadence (a frame callback or a
//! timer of a few milliseconds). After each input the session binds the
//! active slide's cue; audio state never flows back into navigation.

use std::time::Duration;

use horizon_overture_core::SharedClock;
use horizon_overture_core::logging::targets;
use horizon_overture_multimedia::{
    AudioEngine, AudioStatus, MediaBackend, RodioBackend, ToggleOutcome,
};

use crate::error::Result;
use crate::gesture::{SwipeDirection, SwipeRecognizer};
use crate::input::{InputEvent, NavCommand, PointerEvent, PointerPhase};
use crate::navigation::{DeckState, NavigationController};
use crate::settings::Settings;
use crate::slide::{Slide, SlideId, SlideKind};
use crate::source::SlideSource;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationView {
    pub deck_state: DeckState,
    pub current_index: usize,
    pub secondary_index: usize,
    pub slide_count: usize,
    /// The slide on screen.
    pub slide: Option<Slide>,
    /// Which renderer draws it.
    pub kind: Option<SlideKind>,
    /// The highlighted sub-item, if the slide has any.
    pub sub_item: Option<String>,
    pub revealed: Option<SlideId>,
    pub scroll_progress: f64,
    pub audio: AudioStatus,
}

/// A running presentation.
pub struct Presentation<B: MediaBackend> {
    navigation: NavigationController,
    audio: AudioEngine<B>,
    swipe: SwipeRecognizer,
}

impl<B: MediaBackend> Presentation<B> {
    /// Create a session on the wall clock.
    pub fn new(backend: B, settings: &Settings) -> Self {
        Self::assemble(AudioEngine::new(backend, settings.engine_config()), settings)
    }

    /// Create a session whose timers read `clock`.
    pub fn with_clock(backend: B, settings: &Settings, clock: SharedClock) -> Self {
        Self::assemble(
            AudioEngine::with_clock(backend, settings.engine_config(), clock),
            settings,
        )
    }

    fn assemble(mut audio: AudioEngine<B>, settings: &Settings) -> Self {
        audio.set_enabled(settings.audio.enabled);
        Self {
            navigation: NavigationController::new(settings.navigation.mode),
            audio,
            swipe: SwipeRecognizer::with_config(settings.swipe_config()),
        }
    }

    /// The navigation controller, for connecting to its signals.
    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// The audio engine, for connecting to its signals.
    pub fn audio(&self) -> &AudioEngine<B> {
        &self.audio
    }

    /// Load the deck and bind the first slide's audio.
    pub async fn load<S: SlideSource>(&mut self, source: &S) -> Result<()> {
        let result = self.navigation.load(source).await;
        self.sync_audio();
        result
    }

    /// React to one input event.
    ///
    /// Returns whether the event was acted on.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let handled = match event {
            InputEvent::ScrollChanged {
                scroll_top,
                scrollable_height,
            } => {
                let before = self.navigation.current_index();
                self.navigation.handle_scroll(scroll_top, scrollable_height);
                self.navigation.current_index() != before
            }
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer),
            InputEvent::Swipe(direction) => self.handle_swipe(direction),
            InputEvent::Key(key) => self.navigation.request(key.command()),
            InputEvent::IndicatorSelected(index) => self.navigation.request(NavCommand::GoTo(index)),
            InputEvent::Action(target) => {
                self.navigation.trigger_action(&target);
                true
            }
        };
        self.sync_audio();
        handled
    }

    fn handle_pointer(&mut self, pointer: PointerEvent) -> bool {
        match pointer.phase {
            PointerPhase::Pressed => {
                self.swipe.press(pointer.position, pointer.at);
                false
            }
            PointerPhase::Moved => false,
            PointerPhase::Released => match self.swipe.release(pointer.position, pointer.at) {
                Some(swipe) => self.handle_swipe(swipe.direction),
                None => false,
            },
            PointerPhase::Cancelled => {
                self.swipe.cancel();
                false
            }
        }
    }

    fn handle_swipe(&mut self, direction: SwipeDirection) -> bool {
        tracing::trace!(target: targets::SESSION, ?direction, "swipe");
        self.navigation.request(NavCommand::from_swipe(direction))
    }

    /// Issue a navigation command, as a key or an on-screen button would.
    pub fn navigate(&mut self, command: NavCommand) -> bool {
        let handled = self.navigation.request(command);
        self.sync_audio();
        handled
    }

    /// The play/pause button.
    pub fn toggle_audio(&mut self) -> ToggleOutcome {
        self.audio.toggle()
    }

    /// The viewer allowed sound outside the player (for example by
    /// accepting an intro screen). Fires autoplay once.
    pub fn grant_audio_permission(&mut self) -> bool {
        self.audio.request_autoplay()
    }

    /// Turn background audio on or off.
    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio.set_enabled(enabled);
    }

    /// Advance audio timers. Call regularly from the host's event loop.
    pub fn tick(&mut self) {
        self.audio.tick();
    }

    /// How long until the next timer is due, for hosts that sleep between
    /// ticks. `None` when nothing is scheduled.
    pub fn time_until_next_tick(&mut self) -> Option<Duration> {
        self.audio.time_until_next_timer()
    }

    /// A snapshot for rendering.
    pub fn view(&self) -> PresentationView {
        let slide = self.navigation.active_slide();
        let secondary_index = self.navigation.secondary_index();
        PresentationView {
            deck_state: self.navigation.state(),
            current_index: self.navigation.current_index(),
            secondary_index,
            slide_count: self.navigation.slide_count(),
            slide: slide.cloned(),
            kind: slide.map(Slide::kind),
            sub_item: slide.and_then(|slide| slide.sub_items().get(secondary_index).cloned()),
            revealed: self.navigation.revealed(),
            scroll_progress: self.navigation.scroll_progress(),
            audio: self.audio.status(),
        }
    }

    /// Stop all audio and release every track.
    pub fn shutdown(&mut self) {
        tracing::debug!(target: targets::SESSION, "presentation shutting down");
        self.audio.shutdown();
    }

    fn sync_audio(&mut self) {
        let cue = self.navigation.active_slide().and_then(Slide::cue);
        self.audio.bind(cue);
    }
}

impl Presentation<RodioBackend> {
    /// Create a session playing through the default audio output device.
    pub fn with_default_output(settings: &Settings) -> horizon_overture_multimedia::Result<Self> {
        let mut backend = RodioBackend::new()?;
        if let Some(dir) = &settings.audio.base_dir {
            backend = backend.with_base_dir(dir);
        }
        Ok(Self::new(backend, settings))
    }
}

impl<B: MediaBackend> std::fmt::Debug for Presentation<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("navigation", &self.navigation)
            .field("audio", &self.audio)
            .finish()
    }
}
