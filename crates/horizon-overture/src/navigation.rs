//! The navigation controller.
//!
//! [`NavigationController`] owns the deck and the two cursors into it: the
//! primary slide index and the secondary index within the active slide's
//! sub-items. It never looks at audio state; the session reads the active
//! slide from here and feeds its cue to the audio engine.
//!
//! # Modes
//!
//! In [`NavigationMode::Scroll`] the scroll offset is the single source of
//! truth. Discrete commands go through [`NavigationController::request`],
//! which emits [`scroll_requested`](NavigationController::scroll_requested)
//! and lets the index follow when the resulting scroll events arrive. In
//! [`NavigationMode::Direct`] commands move the index immediately and scroll
//! events only update the reported progress.
//!
//! # Example
//!
//! ```
//! use horizon_overture::deck::Deck;
//! use horizon_overture::navigation::{NavigationController, NavigationMode};
//! use horizon_overture::slide::Slide;
//!
//! let mut nav = NavigationController::new(NavigationMode::Direct);
//! nav.install(Deck::new(vec![Slide::numbered(1, "Hola"), Slide::numbered(2, "Por qué")]).unwrap());
//!
//! nav.index_changed().connect(|index| println!("slide {index}"));
//! assert!(nav.advance());
//! assert_eq!(nav.current_index(), 1);
//! assert!(!nav.advance());
//! ```

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use horizon_overture_core::logging::targets;
use horizon_overture_core::{PerfSpan, Property, Signal};

use crate::deck::Deck;
use crate::error::Result;
use crate::input::NavCommand;
use crate::scroll::{map_scroll_offset_to_index, scroll_offset_for_index, scroll_progress};
use crate::slide::{Slide, SlideId};
use crate::source::SlideSource;

/// Load state of the deck.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeckState {
    /// Nothing requested yet.
    #[default]
    Unloaded,
    /// A fetch is in flight.
    Loading,
    /// The deck is ready.
    Loaded,
    /// The fetch or validation failed. The deck is empty.
    Failed(String),
}

impl DeckState {
    /// Whether navigation is allowed.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// How discrete navigation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Discrete commands become scroll requests.
    #[default]
    Scroll,
    /// Discrete commands move the index immediately.
    Direct,
}

/// Ask the host to smooth-scroll to a slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// The slide that will become active once the scroll lands.
    pub index: usize,
    /// Target scroll offset in pixels.
    pub offset: f64,
}

/// Owns the deck and the navigation cursors.
pub struct NavigationController {
    deck: Deck,
    mode: NavigationMode,
    state: Property<DeckState>,
    current_index: Property<usize>,
    secondary_index: Property<usize>,
    revealed: Property<Option<SlideId>>,
    scrollable_height: f64,
    scroll_progress: f64,

    index_changed: Signal<usize>,
    secondary_index_changed: Signal<usize>,
    deck_state_changed: Signal<DeckState>,
    scroll_requested: Signal<ScrollRequest>,
    reveal_changed: Signal<Option<SlideId>>,
    action_triggered: Signal<String>,
}

impl NavigationController {
    /// Create a controller with no deck.
    pub fn new(mode: NavigationMode) -> Self {
        Self {
            deck: Deck::default(),
            mode,
            state: Property::new(DeckState::Unloaded),
            current_index: Property::new(0),
            secondary_index: Property::new(0),
            revealed: Property::new(None),
            scrollable_height: 0.0,
            scroll_progress: 0.0,
            index_changed: Signal::new(),
            secondary_index_changed: Signal::new(),
            deck_state_changed: Signal::new(),
            scroll_requested: Signal::new(),
            reveal_changed: Signal::new(),
            action_triggered: Signal::new(),
        }
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Emitted with the new primary index.
    pub fn index_changed(&self) -> &Signal<usize> {
        &self.index_changed
    }

    /// Emitted with the new secondary index.
    pub fn secondary_index_changed(&self) -> &Signal<usize> {
        &self.secondary_index_changed
    }

    /// Emitted when the deck state changes.
    pub fn deck_state_changed(&self) -> &Signal<DeckState> {
        &self.deck_state_changed
    }

    /// Emitted in scroll mode when a command needs the host to scroll.
    pub fn scroll_requested(&self) -> &Signal<ScrollRequest> {
        &self.scroll_requested
    }

    /// Emitted when a hidden slide is revealed (`Some`) or closed (`None`).
    pub fn reveal_changed(&self) -> &Signal<Option<SlideId>> {
        &self.reveal_changed
    }

    /// Emitted for call-to-action targets that are not hidden slides.
    pub fn action_triggered(&self) -> &Signal<String> {
        &self.action_triggered
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The deck. Empty unless loaded.
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// The sequential slides.
    pub fn slides(&self) -> &[Slide] {
        self.deck.slides()
    }

    /// Number of sequential slides.
    pub fn slide_count(&self) -> usize {
        self.deck.len()
    }

    /// Load state.
    pub fn state(&self) -> DeckState {
        self.state.get()
    }

    /// Navigation mode.
    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    /// Change the navigation mode.
    pub fn set_mode(&mut self, mode: NavigationMode) {
        self.mode = mode;
    }

    /// The primary slide index.
    pub fn current_index(&self) -> usize {
        self.current_index.get()
    }

    /// The index within the active slide's sub-items.
    pub fn secondary_index(&self) -> usize {
        self.secondary_index.get()
    }

    /// The id of the revealed hidden slide, if one is open.
    pub fn revealed(&self) -> Option<SlideId> {
        self.revealed.get()
    }

    /// Last reported scroll progress in `[0, 1]`.
    pub fn scroll_progress(&self) -> f64 {
        self.scroll_progress
    }

    /// Last reported scrollable height.
    pub fn scrollable_height(&self) -> f64 {
        self.scrollable_height
    }

    /// The slide on screen: the revealed slide if one is open, otherwise the
    /// slide at the primary index.
    pub fn active_slide(&self) -> Option<&Slide> {
        match self.revealed.get() {
            Some(SlideId::Tag(tag)) => self.deck.find_hidden(&tag),
            _ => self.deck.get(self.current_index()),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch, parse and install a deck.
    ///
    /// On failure the deck is emptied, the state becomes
    /// [`DeckState::Failed`] and the error is returned. There is no retry.
    pub async fn load<S: SlideSource>(&mut self, source: &S) -> Result<()> {
        let description = source.describe();
        tracing::info!(target: targets::DECK, source = %description, "loading deck");

        self.deck = Deck::default();
        self.reset_cursors();
        self.set_state(DeckState::Loading);

        let fetched = source
            .fetch()
            .instrument(tracing::info_span!(target: targets::PERF, "perf", operation = "deck_fetch"))
            .await;
        let result = fetched.and_then(|payload| {
            let _span = PerfSpan::new("deck_parse");
            Deck::from_json(&payload)
        });

        match result {
            Ok(deck) => {
                self.install(deck);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(target: targets::DECK, source = %description, error = %e, "deck load failed");
                self.set_state(DeckState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Install an already validated deck and move to the first slide.
    pub fn install(&mut self, deck: Deck) {
        tracing::debug!(target: targets::NAVIGATION, slides = deck.len(), "deck installed");
        self.deck = deck;
        self.reset_cursors();
        self.set_state(DeckState::Loaded);
    }

    fn set_state(&self, state: DeckState) {
        if self.state.set(state.clone()) {
            self.deck_state_changed.emit(state);
        }
    }

    fn reset_cursors(&self) {
        self.close_reveal();
        self.set_current(0);
        self.set_secondary(0);
    }

    // =========================================================================
    // Primary navigation
    // =========================================================================

    /// Show slide `index` and reset the secondary index.
    ///
    /// Ignored when `index` is out of range or the deck is not loaded.
    /// Closes any revealed slide.
    pub fn go_to_index(&mut self, index: usize) -> bool {
        if !self.state.with(DeckState::is_loaded) || index >= self.deck.len() {
            tracing::trace!(target: targets::NAVIGATION, index, "ignoring out-of-range navigation");
            return false;
        }
        self.close_reveal();
        self.set_current(index);
        self.set_secondary(0);
        true
    }

    /// Next slide. Does nothing at the last slide.
    pub fn advance(&mut self) -> bool {
        self.go_to_index(self.current_index() + 1)
    }

    /// Previous slide. Does nothing at the first slide.
    pub fn retreat(&mut self) -> bool {
        match self.current_index().checked_sub(1) {
            Some(index) => self.go_to_index(index),
            None => false,
        }
    }

    /// First slide.
    pub fn first(&mut self) -> bool {
        self.go_to_index(0)
    }

    /// Last slide.
    pub fn last(&mut self) -> bool {
        match self.deck.len().checked_sub(1) {
            Some(index) => self.go_to_index(index),
            None => false,
        }
    }

    fn set_current(&self, index: usize) {
        if self.current_index.set(index) {
            tracing::debug!(target: targets::NAVIGATION, index, "slide changed");
            self.index_changed.emit(index);
        }
    }

    // =========================================================================
    // Secondary navigation
    // =========================================================================

    /// Set the secondary index, wrapping modulo the active slide's sub-item
    /// count. A slide without sub-items always has secondary index `0`.
    pub fn set_secondary_index(&mut self, index: usize) -> bool {
        if !self.state.with(DeckState::is_loaded) {
            return false;
        }
        let count = self.sub_item_count();
        let index = if count == 0 { 0 } else { index % count };
        self.set_secondary(index);
        true
    }

    /// Next sub-item, wrapping to the first.
    pub fn next_sub_item(&mut self) -> bool {
        let count = self.sub_item_count();
        if count == 0 {
            return false;
        }
        self.set_secondary_index((self.secondary_index() + 1) % count)
    }

    /// Previous sub-item, wrapping to the last.
    pub fn prev_sub_item(&mut self) -> bool {
        let count = self.sub_item_count();
        if count == 0 {
            return false;
        }
        self.set_secondary_index((self.secondary_index() + count - 1) % count)
    }

    fn sub_item_count(&self) -> usize {
        self.active_slide().map_or(0, |slide| slide.sub_items().len())
    }

    fn set_secondary(&self, index: usize) {
        if self.secondary_index.set(index) {
            self.secondary_index_changed.emit(index);
        }
    }

    // =========================================================================
    // Scroll
    // =========================================================================

    /// React to the scroll container moving.
    ///
    /// Always records the geometry. In scroll mode the primary index follows
    /// the offset.
    pub fn handle_scroll(&mut self, scroll_top: f64, scrollable_height: f64) {
        self.scrollable_height = scrollable_height;
        self.scroll_progress = scroll_progress(scroll_top, scrollable_height);

        if self.mode == NavigationMode::Scroll && self.state.with(DeckState::is_loaded) {
            let index = map_scroll_offset_to_index(scroll_top, scrollable_height, self.deck.len());
            if index != self.current_index() {
                self.go_to_index(index);
            }
        }
    }

    /// Apply a discrete command according to the navigation mode.
    ///
    /// In scroll mode, primary commands emit a [`ScrollRequest`] and leave
    /// the index alone; when nothing is scrollable yet they apply directly.
    /// Sub-item commands always apply directly.
    pub fn request(&mut self, command: NavCommand) -> bool {
        if !self.state.with(DeckState::is_loaded) {
            return false;
        }

        let target = match command {
            NavCommand::NextSubItem => return self.next_sub_item(),
            NavCommand::PrevSubItem => return self.prev_sub_item(),
            NavCommand::Advance => self.current_index().checked_add(1),
            NavCommand::Retreat => self.current_index().checked_sub(1),
            NavCommand::First => Some(0),
            NavCommand::Last => self.deck.len().checked_sub(1),
            NavCommand::GoTo(index) => Some(index),
        };
        let Some(index) = target.filter(|&index| index < self.deck.len()) else {
            return false;
        };

        if self.mode == NavigationMode::Scroll && self.scrollable_height > 0.0 {
            self.close_reveal();
            let offset = scroll_offset_for_index(index, self.scrollable_height, self.deck.len());
            tracing::trace!(target: targets::NAVIGATION, index, offset, "requesting scroll");
            self.scroll_requested.emit(ScrollRequest { index, offset });
            true
        } else {
            self.go_to_index(index)
        }
    }

    // =========================================================================
    // Hidden slides and actions
    // =========================================================================

    /// Show the hidden slide tagged `tag` over the current one.
    pub fn reveal(&mut self, tag: &str) -> bool {
        if !self.state.with(DeckState::is_loaded) || self.deck.find_hidden(tag).is_none() {
            return false;
        }
        let id = SlideId::from(tag);
        if self.revealed.set(Some(id.clone())) {
            tracing::debug!(target: targets::NAVIGATION, id = %id, "slide revealed");
            self.reveal_changed.emit(Some(id));
        }
        self.set_secondary(0);
        true
    }

    /// Close the revealed slide, if any.
    pub fn close_reveal(&self) -> bool {
        if self.revealed.set(None) {
            self.reveal_changed.emit(None);
            self.set_secondary(0);
            true
        } else {
            false
        }
    }

    /// Activate a call-to-action target such as `#secret` or `#contact`.
    ///
    /// Targets naming a hidden slide reveal it; anything else is passed on
    /// through [`action_triggered`](Self::action_triggered).
    pub fn trigger_action(&mut self, target: &str) -> bool {
        let tag = target.strip_prefix('#').unwrap_or(target);
        if self.reveal(tag) {
            return true;
        }
        tracing::debug!(target: targets::NAVIGATION, action = target, "action triggered");
        self.action_triggered.emit(target.to_string());
        false
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(NavigationMode::default())
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("mode", &self.mode)
            .field("state", &self.state.get())
            .field("slides", &self.deck.len())
            .field("current_index", &self.current_index.get())
            .field("secondary_index", &self.secondary_index.get())
            .field("revealed", &self.revealed.get())
            .finish()
    }
}
