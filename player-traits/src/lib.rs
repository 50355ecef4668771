//! # Player Contracts
//!
//! Shared vocabulary and capability traits for the A/V playback engine.
//!
//! ## Overview
//!
//! This crate defines the contract between the orchestration layer
//! (`player-core`) and the concrete backend adapters (`player-backends`).
//! Nothing here spawns a process; the crate only says what any player can
//! do and how it reports what happened.
//!
//! ## Contents
//!
//! ### Playback
//! - [`MediaPlayer`](playback::MediaPlayer) - Uniform play/stop/volume surface over an external binary
//! - [`BackendKind`](playback::BackendKind) - Backend names used in preference orders (with VLC aliasing)
//! - [`validate_volume`](playback::validate_volume) / [`parse_volume`](playback::parse_volume) - The universal 0-100 volume scale
//!
//! ### Events
//! - [`PlayerEvents`](events::PlayerEvents) - Broadcast channel every player emits on
//! - [`PlayerEventStream`](events::PlayerEventStream) - Subscriber handle with optional filtering
//! - [`PlayerEvent`](events::PlayerEvent) - `Started` / `Stopped` / `Error`
//!
//! ### Logging
//! - [`LoggerSink`](logging::LoggerSink) - Host-provided log destination
//! - [`PlayerLogger`](logging::PlayerLogger) - Scoped handle components log through
//! - [`ConsoleLogger`](logging::ConsoleLogger) / [`NoopLogger`](logging::NoopLogger) - Built-in sinks
//!
//! ### Errors
//! - [`PlayerError`](error::PlayerError) - Engine error taxonomy with classification helpers
//!
//! ## Error reporting model
//!
//! Configuration and selection problems are returned synchronously
//! (`Result`); everything that happens after a subprocess is launched is
//! asynchronous and arrives as [`PlayerEvent::Error`](events::PlayerEvent)
//! on the event stream. Subscribe before playing.
//!
//! ## Thread safety
//!
//! All traits require `Send + Sync`; handles (`PlayerEvents`,
//! `PlayerLogger`) are cheap to clone and safe to share across tasks.

pub mod error;
pub mod events;
pub mod logging;
pub mod playback;

pub use error::{PlayerError, Result};

// Re-export commonly used types
pub use events::{PlayerEvent, PlayerEventStream, PlayerEvents};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink, NoopLogger, PlayerLogger};
pub use playback::{parse_volume, validate_volume, BackendKind, MediaPlayer, MAX_VOLUME};
