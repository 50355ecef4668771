//! Universal playback contract and backend vocabulary.
//!
//! These abstractions let the selection factory and the orchestrator drive
//! any supported player binary through one interface. Concrete adapters live
//! in `player-backends`; everything here is backend-agnostic: which backends
//! exist ([`BackendKind`]), what any of them can do ([`MediaPlayer`]), and
//! the universal volume scale shared by all of them.

use crate::error::{PlayerError, Result};
use crate::events::PlayerEventStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Upper bound of the universal volume scale.
///
/// Every surface of the engine speaks 0..=100; each adapter converts to its
/// backend's native scale exactly once, when building spawn arguments.
pub const MAX_VOLUME: u8 = 100;

/// Validate a universal volume value.
///
/// # Errors
///
/// Returns [`PlayerError::InvalidVolume`] when the value exceeds
/// [`MAX_VOLUME`].
pub fn validate_volume(volume: u8) -> Result<u8> {
    if volume > MAX_VOLUME {
        return Err(PlayerError::InvalidVolume {
            value: volume.to_string(),
        });
    }
    Ok(volume)
}

/// Parse a universal volume value from text (CLI / config input).
///
/// # Errors
///
/// Returns [`PlayerError::InvalidVolume`] for non-numeric input or values
/// outside 0..=100.
pub fn parse_volume(input: &str) -> Result<u8> {
    let parsed = input
        .trim()
        .parse::<u8>()
        .map_err(|_| PlayerError::InvalidVolume {
            value: input.to_string(),
        })?;
    validate_volume(parsed)
}

/// Names a supported player backend in a selection preference order.
///
/// `Vlc` and `Cvlc` are aliases for the same adapter family; a preference
/// list may use either name and both resolve to whichever probe result the
/// VLC family produced. This mirrors how a single binary can be referred to
/// under more than one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    OmxPlayer,
    Vlc,
    Cvlc,
    MPlayer,
}

impl BackendKind {
    /// All known backend names, aliases included.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::OmxPlayer,
        BackendKind::Vlc,
        BackendKind::Cvlc,
        BackendKind::MPlayer,
    ];

    /// The executable this backend drives.
    pub fn binary(&self) -> &'static str {
        match self {
            BackendKind::OmxPlayer => "omxplayer",
            BackendKind::Vlc | BackendKind::Cvlc => "cvlc",
            BackendKind::MPlayer => "mplayer",
        }
    }

    /// Collapses aliases onto one representative kind per adapter family.
    ///
    /// Family-wide state (availability, argument overrides) is stored under
    /// the canonical kind so that configuring `vlc` and playing via `cvlc`
    /// agree.
    pub fn canonical(&self) -> BackendKind {
        match self {
            BackendKind::Cvlc => BackendKind::Vlc,
            other => *other,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::OmxPlayer => "omxplayer",
            BackendKind::Vlc => "vlc",
            BackendKind::Cvlc => "cvlc",
            BackendKind::MPlayer => "mplayer",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "omxplayer" => Ok(BackendKind::OmxPlayer),
            "vlc" => Ok(BackendKind::Vlc),
            "cvlc" => Ok(BackendKind::Cvlc),
            "mplayer" => Ok(BackendKind::MPlayer),
            other => Err(PlayerError::UnknownBackend {
                name: other.to_string(),
            }),
        }
    }
}

/// Uniform playback interface over an external player binary.
///
/// Implementations supervise one subprocess at a time and report its
/// lifecycle on their event stream. `play` resolves as soon as the process
/// is launched; anything that goes wrong afterwards (spawn refusal, crash,
/// unreadable file) arrives as a [`PlayerEvent::Error`], so subscribe
/// before playing.
///
/// [`PlayerEvent::Error`]: crate::events::PlayerEvent::Error
#[async_trait::async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Start playing the given file.
    ///
    /// Resolves once the subprocess is launched. Runtime failures are
    /// reported on the event stream, not through the returned result.
    async fn play(&self, file: &Path) -> Result<()>;

    /// Stop playback.
    ///
    /// Idempotent: stopping an idle player succeeds without emitting
    /// anything; a running session is signalled with SIGINT and exactly one
    /// `Stopped` event fires for it.
    async fn stop(&self) -> Result<()>;

    /// Store the universal volume (0..=100) for the next `play`.
    ///
    /// The current subprocess is unaffected; volume only travels on the
    /// command line.
    fn set_volume(&self, volume: u8);

    /// The stored universal volume.
    fn volume(&self) -> u8;

    /// Whether a supervised subprocess is currently registered.
    fn running(&self) -> bool;

    /// Backend display name (`cvlc`, `mplayer`, `omxplayer`).
    fn name(&self) -> &'static str;

    /// New independent receiver on this player's event stream.
    fn subscribe(&self) -> PlayerEventStream;
}
