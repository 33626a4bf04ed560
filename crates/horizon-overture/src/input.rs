//! Input events and the navigation commands they map to.
//!
//! Hosts translate their native events (window keys, touch points, scroll
//! notifications, clicks on the slide indicator) into [`InputEvent`]s and
//! hand them to the presentation session.

use std::time::Duration;

use crate::gesture::{Point, SwipeDirection};

/// Keys that drive navigation.
///
/// Named after web `KeyboardEvent.key` values so shells can map them
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    Space,
}

impl NavKey {
    /// Parse a web key name such as `"ArrowDown"` or `" "`.
    ///
    /// Returns `None` for keys that do not navigate.
    pub fn from_key_name(name: &str) -> Option<Self> {
        let key = match name {
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Home" => Self::Home,
            "End" => Self::End,
            " " | "Space" | "Spacebar" => Self::Space,
            _ => return None,
        };
        Some(key)
    }

    /// The command this key issues.
    pub fn command(self) -> NavCommand {
        match self {
            Self::ArrowDown | Self::PageDown | Self::Space => NavCommand::Advance,
            Self::ArrowUp | Self::PageUp => NavCommand::Retreat,
            Self::Home => NavCommand::First,
            Self::End => NavCommand::Last,
            Self::ArrowRight => NavCommand::NextSubItem,
            Self::ArrowLeft => NavCommand::PrevSubItem,
        }
    }
}

/// A discrete navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCommand {
    /// Next slide; nothing at the last one.
    Advance,
    /// Previous slide; nothing at the first one.
    Retreat,
    /// First slide.
    First,
    /// Last slide.
    Last,
    /// Next sub-item of the active slide, wrapping.
    NextSubItem,
    /// Previous sub-item of the active slide, wrapping.
    PrevSubItem,
    /// A specific slide.
    GoTo(usize),
}

impl NavCommand {
    /// The command a recognized swipe issues.
    ///
    /// Swiping up moves forward through the deck; swiping left pages forward
    /// through the active slide's items.
    pub fn from_swipe(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Up => Self::Advance,
            SwipeDirection::Down => Self::Retreat,
            SwipeDirection::Left => Self::NextSubItem,
            SwipeDirection::Right => Self::PrevSubItem,
        }
    }

    /// Whether this command changes the primary index.
    pub fn is_primary(self) -> bool {
        !matches!(self, Self::NextSubItem | Self::PrevSubItem)
    }
}

/// Stage of a pointer stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Pressed,
    Moved,
    Released,
    Cancelled,
}

/// One raw pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point,
    /// Host timestamp from any monotonic origin.
    pub at: Duration,
}

impl PointerEvent {
    /// Create a pointer sample.
    pub fn new(phase: PointerPhase, position: Point, at: Duration) -> Self {
        Self { phase, position, at }
    }
}

/// Everything the presentation reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The scroll container moved.
    ScrollChanged { scroll_top: f64, scrollable_height: f64 },
    /// A raw pointer sample, fed to the swipe recognizer.
    Pointer(PointerEvent),
    /// A swipe the host recognized itself.
    Swipe(SwipeDirection),
    /// A navigation key.
    Key(NavKey),
    /// A dot in the slide indicator was clicked.
    IndicatorSelected(usize),
    /// A call to action was activated with this target.
    Action(String),
}
