//! Audio cues: what a slide wants to hear.

use std::fmt;
use std::time::Duration;

/// The `[start, end]` interval, in seconds, that a cue repeats within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopWindow {
    start: Duration,
    end: Duration,
}

/// Why a loop window was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopWindowError {
    /// A bound was negative, NaN, infinite or too large for a playback position.
    InvalidBound(f64),
    /// `start` was not strictly before `end`.
    Empty { start: f64, end: f64 },
}

impl fmt::Display for LoopWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBound(value) => write!(f, "loop bound {value} is not a valid playback position"),
            Self::Empty { start, end } => write!(f, "loop start {start} must be before loop end {end}"),
        }
    }
}

impl std::error::Error for LoopWindowError {}

impl LoopWindow {
    /// Create a loop window, checking `0 <= start < end`.
    pub fn new(start: f64, end: f64) -> Result<Self, LoopWindowError> {
        let start_position = position_from_secs(start)?;
        let end_position = position_from_secs(end)?;
        if start_position >= end_position {
            return Err(LoopWindowError::Empty { start, end });
        }
        Ok(Self {
            start: start_position,
            end: end_position,
        })
    }

    /// Loop start in seconds.
    pub fn start_secs(&self) -> f64 {
        self.start.as_secs_f64()
    }

    /// Loop end in seconds.
    pub fn end_secs(&self) -> f64 {
        self.end.as_secs_f64()
    }

    /// Loop start as a playback position.
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Loop end as a playback position.
    pub fn end(&self) -> Duration {
        self.end
    }

    /// Whether playback at `position` has reached the end of the window.
    pub fn is_exhausted_at(&self, position: Duration) -> bool {
        position >= self.end()
    }
}

fn position_from_secs(secs: f64) -> Result<Duration, LoopWindowError> {
    Duration::try_from_secs_f64(secs).map_err(|_| LoopWindowError::InvalidBound(secs))
}

/// A slide's audio configuration: a source URI and the window to loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    /// Source URI: a file path, `file://` URI or `http(s)://` URL.
    pub source: String,
    /// The window the cue repeats within.
    pub loop_window: LoopWindow,
}

impl AudioCue {
    /// Create a cue.
    pub fn new(source: impl Into<String>, loop_window: LoopWindow) -> Self {
        Self {
            source: source.into(),
            loop_window,
        }
    }

    /// Whether two cues play the same resource.
    pub fn same_source(&self, other: &AudioCue) -> bool {
        self.source == other.source
    }
}
