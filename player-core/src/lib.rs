//! # AV Player Engine
//!
//! Plays one audio or video file at a time by delegating to whichever
//! supported player binary is installed on the host: `omxplayer`, the VLC
//! command line (`cvlc`), or `mplayer`. Selection, process lifecycle, and
//! events are uniform across backends; hosts code against [`AvPlayer`] and
//! never against a specific binary.
//!
//! ## Overview
//!
//! - [`AvPlayerFactory`] probes the host once, logs what it found, and
//!   constructs the first available backend in the configured preference
//!   order.
//! - [`AvPlayer`] wraps the adapter with stop-before-play sequencing,
//!   universal volume, loop-on-natural-end, elapsed time, and a
//!   serializable [`PlayerStatus`].
//! - [`FactoryConfig`] carries the preference order, per-backend extra
//!   arguments, an optional replacement environment, and the logger sink.
//!
//! ## Quickstart
//!
//! ```no_run
//! use player_core::{AvPlayer, PlayerEvent};
//!
//! #[tokio::main]
//! async fn main() -> player_core::Result<()> {
//!     let player = AvPlayer::new();
//!     let mut events = player.subscribe();
//!
//!     player.set_volume(80)?;
//!     player.play("/media/intro.mp3").await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             PlayerEvent::Stopped => break,
//!             PlayerEvent::Error(error) => eprintln!("playback failed: {error}"),
//!             PlayerEvent::Started => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod factory;
pub mod player;

pub use config::{FactoryConfig, DEFAULT_PREFERRED_ORDER};
pub use factory::{AvPlayerFactory, AvailabilityMap};
pub use player::{AvPlayer, PlayerStatus, DEFAULT_PLAYER_VOLUME};

// Contract types callers need alongside the engine.
pub use player_traits::error::{PlayerError, Result};
pub use player_traits::events::{PlayerEvent, PlayerEventStream};
pub use player_traits::logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use player_traits::playback::{parse_volume, BackendKind, MediaPlayer, MAX_VOLUME};
