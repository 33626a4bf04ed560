//! Logging facilities for Horizon Overture.
//!
//! Horizon Overture uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in the host
//! application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_overture_multimedia=debug")
//!     .init();
//! ```
//!
//! Audio failures are never surfaced to the viewer; they are reported at
//! `warn` level on the multimedia target, so that target is the one to watch
//! when a slide stays silent.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Timer system target.
    pub const TIMER: &str = "horizon_overture_core::timer";
    /// Signal system target.
    pub const SIGNAL: &str = "horizon_overture_core::signal";
    /// Audio engine target.
    pub const AUDIO_ENGINE: &str = "horizon_overture_multimedia::engine";
    /// Media backend target.
    pub const MEDIA_BACKEND: &str = "horizon_overture_multimedia::backend";
    /// Navigation controller target.
    pub const NAVIGATION: &str = "horizon_overture::navigation";
    /// Deck loading target.
    pub const DECK: &str = "horizon_overture::deck";
    /// Presentation session target.
    pub const SESSION: &str = "horizon_overture::session";
    /// Performance span target.
    pub const PERF: &str = "horizon_overture::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for measuring how long an operation such as a deck load takes.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
