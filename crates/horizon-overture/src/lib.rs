//! Horizon Overture - a scroll-driven slide deck with per-slide background audio.
//!
//! This is the main umbrella crate. It re-exports the core and multimedia
//! crates and adds the presentation layer on top:
//!
//! - [`slide`] and [`deck`]: the slide records and validated decks
//! - [`source`]: where deck payloads come from (memory, file, HTTP)
//! - [`navigation`]: the primary and secondary cursors, scroll mode and reveals
//! - [`scroll`], [`gesture`] and [`input`]: turning host input into commands
//! - [`settings`]: TOML configuration
//! - [`session`]: the [`Presentation`](session::Presentation) that ties it all together
//!
//! # Example
//!
//! ```no_run
//! use horizon_overture::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load("overture.toml")?;
//!     let mut presentation = Presentation::with_default_output(&settings)?;
//!     presentation.load(&settings.source()?).await?;
//!
//!     presentation.handle_input(InputEvent::Key(NavKey::ArrowDown));
//!     presentation.grant_audio_permission();
//!     loop {
//!         presentation.tick();
//!         tokio::time::sleep(std::time::Duration::from_millis(16)).await;
//!     }
//! }
//! ```

pub use horizon_overture_core::*;

/// Background audio module.
pub mod multimedia {
    pub use horizon_overture_multimedia::*;
}

pub mod deck;
pub mod error;
pub mod gesture;
pub mod input;
pub mod navigation;
pub mod prelude;
pub mod scroll;
pub mod session;
pub mod settings;
pub mod slide;
pub mod source;
