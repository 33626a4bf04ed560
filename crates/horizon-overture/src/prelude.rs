//! Prelude module for Horizon Overture.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use horizon_overture::prelude::*;
//! ```

// ============================================================================
// Signal/Slot and Property System
// ============================================================================

pub use crate::signal::{ConnectionId, Signal};
pub use crate::property::Property;

// ============================================================================
// Deck
// ============================================================================

pub use crate::deck::Deck;
pub use crate::error::{DeckError, SettingsError};
pub use crate::slide::{CallToAction, CtaVariant, Slide, SlideId, SlideKind};
pub use crate::source::{ConfiguredSource, FileSource, HttpSource, SlideSource, StaticSource};

// ============================================================================
// Navigation and Input
// ============================================================================

pub use crate::gesture::{Point, SwipeDirection, SwipeRecognizer};
pub use crate::input::{InputEvent, NavCommand, NavKey, PointerEvent, PointerPhase};
pub use crate::navigation::{DeckState, NavigationController, NavigationMode, ScrollRequest};

// ============================================================================
// Audio
// ============================================================================

pub use crate::multimedia::{AudioCue, AudioEngine, AudioStatus, EnginePhase, LoopWindow, ToggleOutcome};

// ============================================================================
// Session
// ============================================================================

pub use crate::session::{Presentation, PresentationView};
pub use crate::settings::Settings;
