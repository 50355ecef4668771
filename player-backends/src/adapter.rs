//! State every backend adapter composes.
//!
//! An adapter is a thin shell around [`AdapterCore`]: the event channel, the
//! stored universal volume, a scoped logger, the optional custom
//! environment, extra spawn arguments, and the slot tracking the one
//! supervised subprocess. The slot carries a generation counter so that a
//! monitor task whose process has already been replaced or stopped can
//! recognize itself as stale and stay silent.

use parking_lot::Mutex;
use player_traits::events::{PlayerEvent, PlayerEvents, PlayerEventStream};
use player_traits::logging::PlayerLogger;
use player_traits::PlayerError;
use std::collections::HashMap;
use std::sync::Arc;

/// Volume an adapter starts with when driven directly, before any
/// orchestrator applies its own setting.
pub const DEFAULT_ADAPTER_VOLUME: u8 = 50;

/// Construction input for every backend adapter.
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Logger handle, usually already scoped to the backend's display name.
    pub logger: PlayerLogger,
    /// Wholesale replacement environment for the subprocess; `None`
    /// inherits the host environment.
    pub env: Option<HashMap<String, String>>,
    /// Extra arguments appended after the backend's fixed arguments,
    /// before the file path.
    pub extra_args: Vec<String>,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            logger: PlayerLogger::noop(),
            env: None,
            extra_args: Vec::new(),
        }
    }
}

impl AdapterOptions {
    pub fn new(logger: PlayerLogger) -> Self {
        Self {
            logger,
            ..Self::default()
        }
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }
}

/// A subprocess currently tracked by an adapter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveProcess {
    /// OS pid, when the runtime still had one at spawn time.
    pub pid: Option<i32>,
    /// Generation under which the process was registered.
    pub generation: u64,
}

#[derive(Debug, Default)]
struct ProcessSlot {
    generation: u64,
    active: Option<ActiveProcess>,
}

/// Shared state behind each adapter handle.
pub(crate) struct AdapterCore {
    events: PlayerEvents,
    volume: Mutex<u8>,
    logger: PlayerLogger,
    env: Option<HashMap<String, String>>,
    extra_args: Vec<String>,
    slot: Mutex<ProcessSlot>,
}

impl AdapterCore {
    pub fn new(options: AdapterOptions) -> Self {
        Self {
            events: PlayerEvents::default(),
            volume: Mutex::new(DEFAULT_ADAPTER_VOLUME),
            logger: options.logger,
            env: options.env,
            extra_args: options.extra_args,
            slot: Mutex::new(ProcessSlot::default()),
        }
    }

    pub fn logger(&self) -> &PlayerLogger {
        &self.logger
    }

    pub fn env(&self) -> Option<&HashMap<String, String>> {
        self.env.as_ref()
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    pub fn volume(&self) -> u8 {
        *self.volume.lock()
    }

    pub fn set_volume(&self, volume: u8) {
        *self.volume.lock() = volume;
    }

    pub fn running(&self) -> bool {
        self.slot.lock().active.is_some()
    }

    pub fn subscribe(&self) -> PlayerEventStream {
        self.events.subscribe()
    }

    /// Register a freshly spawned process under a new generation.
    ///
    /// Returns the generation the monitor task must present when the
    /// process exits.
    pub fn begin_session(&self, pid: Option<i32>) -> u64 {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        let generation = slot.generation;
        slot.active = Some(ActiveProcess { pid, generation });
        generation
    }

    /// Remove and return the tracked process, whatever its generation.
    ///
    /// The second caller gets `None`; that is what makes `stop` idempotent.
    pub fn take_active(&self) -> Option<ActiveProcess> {
        self.slot.lock().active.take()
    }

    /// Remove and return the tracked process only if it still belongs to
    /// `generation`.
    pub fn take_active_if(&self, generation: u64) -> Option<ActiveProcess> {
        let mut slot = self.slot.lock();
        match slot.active {
            Some(active) if active.generation == generation => slot.active.take(),
            _ => None,
        }
    }

    /// Clear the slot from a monitor task observing its process exit.
    ///
    /// Returns whether this call cleared it; a stale monitor (its process
    /// was already stopped or replaced) gets `false` and must stay silent
    /// on the event channel. The stale exit is only traced.
    pub fn end_session(&self, generation: u64) -> bool {
        let cleared = self.take_active_if(generation).is_some();
        if !cleared {
            tracing::debug!(generation, "process exit for an already-cleared session");
        }
        cleared
    }

    pub fn emit_started(&self) {
        self.events.emit(PlayerEvent::Started);
    }

    pub fn emit_stopped(&self) {
        self.events.emit(PlayerEvent::Stopped);
    }

    pub fn emit_error(&self, error: PlayerError) {
        self.events.emit(PlayerEvent::Error(Arc::new(error)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> AdapterCore {
        AdapterCore::new(AdapterOptions::default())
    }

    #[test]
    fn test_default_volume() {
        let core = core();
        assert_eq!(core.volume(), DEFAULT_ADAPTER_VOLUME);
        core.set_volume(80);
        assert_eq!(core.volume(), 80);
    }

    #[test]
    fn test_running_follows_slot() {
        let core = core();
        assert!(!core.running());

        core.begin_session(Some(1234));
        assert!(core.running());

        assert!(core.take_active().is_some());
        assert!(!core.running());
    }

    #[test]
    fn test_take_active_is_idempotent() {
        let core = core();
        core.begin_session(Some(1234));

        assert!(core.take_active().is_some());
        // Second stop finds nothing and must emit nothing.
        assert!(core.take_active().is_none());
    }

    #[test]
    fn test_stale_monitor_cannot_end_session() {
        let core = core();
        let first = core.begin_session(Some(1));
        // The first process is replaced before its monitor reports.
        let second = core.begin_session(Some(2));

        assert!(!core.end_session(first));
        assert!(core.running(), "stale monitor must not clear a live slot");
        assert!(core.end_session(second));
        assert!(!core.running());
    }

    #[test]
    fn test_end_session_after_stop_is_silent() {
        let core = core();
        let generation = core.begin_session(Some(1));
        assert!(core.take_active().is_some());

        // The monitor of the stopped process reports afterwards.
        assert!(!core.end_session(generation));
    }

    #[test]
    fn test_take_active_if_checks_generation() {
        let core = core();
        let generation = core.begin_session(Some(7));

        assert!(core.take_active_if(generation + 1).is_none());
        let active = core.take_active_if(generation).unwrap();
        assert_eq!(active.pid, Some(7));
    }

    #[test]
    fn test_options_builder() {
        let mut env = HashMap::new();
        env.insert("DISPLAY".to_string(), ":0".to_string());

        let options = AdapterOptions::default()
            .with_env(env)
            .with_extra_args(vec!["-o".to_string(), "both".to_string()]);

        let core = AdapterCore::new(options);
        assert_eq!(core.extra_args(), ["-o", "both"]);
        assert_eq!(
            core.env().and_then(|env| env.get("DISPLAY")).map(String::as_str),
            Some(":0")
        );
    }
}
