//! Core systems for Horizon Overture.
//!
//! This crate provides the foundational pieces shared by the presentation
//! and multimedia crates:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Property System**: Values with change detection
//! - **Clocks**: A wall clock and a manually driven clock for deterministic tests
//! - **Timers**: One-shot and repeating timers polled by the host's event loop
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_overture_core::Signal;
//!
//! let index_changed = Signal::<usize>::new();
//!
//! let conn_id = index_changed.connect(|index| {
//!     println!("Now showing slide {}", index);
//! });
//!
//! index_changed.emit(2);
//! index_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_overture_core::{ManualClock, TimerManager};
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut timers = TimerManager::with_clock(clock.clone());
//! let id = timers.start_repeating(Duration::from_millis(100));
//!
//! clock.advance(Duration::from_millis(100));
//! assert_eq!(timers.process_expired(), vec![id]);
//! ```

mod clock;
pub mod logging;
pub mod property;
pub mod signal;
mod timer;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionId, Signal};
pub use timer::{TimerId, TimerKind, TimerManager};
