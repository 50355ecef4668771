use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("volume must be a number between 0 and 100 (got {value})")]
    InvalidVolume { value: String },

    #[error("unknown backend name: {name}")]
    UnknownBackend { name: String },

    #[error("No players available.")]
    NoPlayersAvailable,

    #[error("failed to run {binary}: {source}")]
    SpawnFailed {
        binary: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open file: {detail}")]
    FileNotOpenable { detail: String },

    #[error("no display surface available: {detail}")]
    DisplayUnavailable { detail: String },
}

impl PlayerError {
    /// A caller-supplied setting was rejected before anything was spawned.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PlayerError::InvalidVolume { .. } | PlayerError::UnknownBackend { .. }
        )
    }

    /// Backend selection exhausted the preference order.
    pub fn is_selection(&self) -> bool {
        matches!(self, PlayerError::NoPlayersAvailable)
    }

    /// The subprocess failed to start or its supervision broke down.
    pub fn is_spawn(&self) -> bool {
        matches!(self, PlayerError::SpawnFailed { .. })
    }

    /// The backend itself reported a content or environment problem.
    pub fn is_playback(&self) -> bool {
        matches!(
            self,
            PlayerError::FileNotOpenable { .. } | PlayerError::DisplayUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
