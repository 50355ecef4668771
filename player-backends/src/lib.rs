//! # Backend Adapters
//!
//! Concrete [`MediaPlayer`](player_traits::MediaPlayer) implementations,
//! one per supported player binary:
//! - [`VlcPlayer`] driving the VLC command-line interface (`cvlc`)
//! - [`MPlayer`] driving classic `mplayer`
//! - [`OmxPlayer`] driving `omxplayer` on Raspberry Pi hosts
//!
//! ## Overview
//!
//! Each adapter supervises at most one subprocess at a time: it converts
//! the universal 0-100 volume to the backend's native scale while building
//! the spawn argument list, drains the subprocess's output into the
//! adapter's logger (unread pipes stall some players), watches for process
//! exit from a monitor task, and stops playback by sending SIGINT. The
//! lifecycle is reported as `Started`/`Stopped`/`Error` events on the
//! adapter's event stream.
//!
//! Adapters are usually constructed by the selection factory in
//! `player-core`, which probes each family's
//! `check_availability()` first; constructing one directly is fine when
//! the backend choice is already known.
//!
//! ## Usage
//!
//! ```no_run
//! use player_backends::{AdapterOptions, VlcPlayer};
//! use player_traits::MediaPlayer;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> player_traits::Result<()> {
//!     if !VlcPlayer::check_availability().await {
//!         return Err(player_traits::PlayerError::NoPlayersAvailable);
//!     }
//!
//!     let player = VlcPlayer::new(AdapterOptions::default());
//!     let mut events = player.subscribe();
//!     player.play(Path::new("intro.mp4")).await?;
//!     let _ = events.recv().await;
//!     Ok(())
//! }
//! ```

mod adapter;
mod mplayer;
mod omxplayer;
mod process;
mod vlc;

pub use adapter::{AdapterOptions, DEFAULT_ADAPTER_VOLUME};
pub use mplayer::MPlayer;
pub use omxplayer::OmxPlayer;
pub use vlc::VlcPlayer;
