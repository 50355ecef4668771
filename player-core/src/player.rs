//! # AV Player
//!
//! [`AvPlayer`] is the high-level playback surface: one file at a time,
//! universal volume, optional loop-on-natural-end, elapsed time, and a
//! status snapshot. It owns an [`AvPlayerFactory`] and creates its backend
//! adapter lazily on the first `play`; afterwards the same adapter is
//! reused for every run.
//!
//! ## Overview
//!
//! - `play` always stops the current run first, so switching files never
//!   leaves two subprocesses racing for the audio device.
//! - Adapter events are forwarded to the player's own channel. A `Stopped`
//!   echoing a stop this player commanded is absorbed; only natural ends
//!   reach the loop logic, which is what keeps looping from fighting with
//!   explicit stops.
//! - `stop` clears the loop flag before anything else, so a natural end
//!   racing the command cannot resurrect playback.
//! - A loop restart re-checks, under the same lock `play` uses, that no
//!   newer play superseded it. The latest user command always wins.
//!
//! Runtime failures surface as [`PlayerEvent::Error`] on
//! [`AvPlayer::subscribe`], never as return values of `play`.

use crate::config::FactoryConfig;
use crate::factory::AvPlayerFactory;
use parking_lot::Mutex;
use player_traits::error::Result;
use player_traits::events::{PlayerEvent, PlayerEventStream, PlayerEvents, RecvError};
use player_traits::playback::{validate_volume, MediaPlayer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;

/// Volume a fresh player starts with.
pub const DEFAULT_PLAYER_VOLUME: u8 = 100;

/// Point-in-time view of the player, serializable for status endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStatus {
    /// Universal volume (0..=100) that the next run will use.
    pub volume: u8,
    /// File most recently handed to `play`, if any.
    pub file: Option<PathBuf>,
    /// Whether a playback subprocess is currently tracked.
    pub running: bool,
}

// ============================================================================
// Player
// ============================================================================

/// Single-file playback engine over whichever backend the host provides.
///
/// Cloning shares the player; all handles observe the same state and the
/// same event stream.
///
/// ```no_run
/// use player_core::player::AvPlayer;
///
/// # async fn demo() -> player_traits::error::Result<()> {
/// let player = AvPlayer::new();
/// player.set_volume(80)?;
/// player.set_loop(true);
/// player.play("/media/intro.mp3").await?;
/// # Ok(())
/// # }
/// ```
///
/// Dropping the player does not terminate a running subprocess; call
/// [`AvPlayer::stop`] first when teardown should end playback.
#[derive(Clone)]
pub struct AvPlayer {
    inner: Arc<PlayerInner>,
}

struct PlayerInner {
    weak_self: Weak<PlayerInner>,
    factory: AvPlayerFactory,
    events: PlayerEvents,
    volume: Mutex<u8>,
    looping: AtomicBool,
    /// Set once a run starts; consumed by the first natural end so each
    /// run restarts at most once.
    restart_armed: AtomicBool,
    /// Bumped by every successful launch. A pending loop restart compares
    /// epochs under `ops` to detect that a newer play superseded it.
    run_epoch: AtomicU64,
    /// Commanded stops the forwarder should absorb instead of treating as
    /// natural ends.
    expected_stops: AtomicUsize,
    forwarding_started: AtomicBool,
    file: Mutex<Option<PathBuf>>,
    started_at: Mutex<Option<Instant>>,
    active: Mutex<Option<Arc<dyn MediaPlayer>>>,
    /// Serializes play/stop sequences; sync getters never touch it.
    ops: AsyncMutex<()>,
}

impl Default for AvPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AvPlayer {
    /// Player over a factory with the default configuration.
    pub fn new() -> Self {
        Self::with_factory(AvPlayerFactory::new())
    }

    /// Player over a prepared factory.
    pub fn with_factory(factory: AvPlayerFactory) -> Self {
        let inner = Arc::new_cyclic(|weak_self| PlayerInner {
            weak_self: weak_self.clone(),
            factory,
            events: PlayerEvents::default(),
            volume: Mutex::new(DEFAULT_PLAYER_VOLUME),
            looping: AtomicBool::new(false),
            restart_armed: AtomicBool::new(false),
            run_epoch: AtomicU64::new(0),
            expected_stops: AtomicUsize::new(0),
            forwarding_started: AtomicBool::new(false),
            file: Mutex::new(None),
            started_at: Mutex::new(None),
            active: Mutex::new(None),
            ops: AsyncMutex::new(()),
        });
        Self { inner }
    }

    /// Player over a factory built from `config`.
    pub fn with_config(config: FactoryConfig) -> Self {
        Self::with_factory(AvPlayerFactory::with_config(config))
    }

    /// Player bound to an already-constructed backend.
    ///
    /// Skips probing and selection entirely. This is the seam for custom
    /// [`MediaPlayer`] implementations.
    pub fn with_media_player(player: Arc<dyn MediaPlayer>) -> Self {
        let handle = Self::with_factory(AvPlayerFactory::new());
        *handle.inner.active.lock() = Some(player);
        handle
    }

    /// Start playing `file`, stopping the current run first.
    ///
    /// The backend adapter is created on the first call; when no supported
    /// binary is installed this returns
    /// [`PlayerError::NoPlayersAvailable`](player_traits::PlayerError::NoPlayersAvailable).
    /// Failures after the subprocess handoff (spawn refusal, crash,
    /// unplayable content) are reported as [`PlayerEvent::Error`] on
    /// [`subscribe`](Self::subscribe) instead.
    pub async fn play(&self, file: impl Into<PathBuf>) -> Result<()> {
        let file = file.into();
        *self.inner.file.lock() = Some(file.clone());

        let _guard = self.inner.ops.lock().await;
        self.inner.play_locked(&file).await
    }

    /// Stop playback and clear the loop flag.
    ///
    /// Safe to call when idle; a second stop emits nothing.
    pub async fn stop(&self) -> Result<()> {
        // Clear the flag before taking the lock: a natural end arriving
        // while we wait must not restart.
        self.inner.looping.store(false, Ordering::SeqCst);

        let _guard = self.inner.ops.lock().await;
        self.inner.stop_active().await
    }

    /// Set the universal volume for subsequent runs.
    ///
    /// A running subprocess keeps its volume; the new value applies when
    /// `play` next launches one.
    ///
    /// # Errors
    ///
    /// Rejects values above 100 with
    /// [`PlayerError::InvalidVolume`](player_traits::PlayerError::InvalidVolume),
    /// leaving the stored volume unchanged.
    pub fn set_volume(&self, volume: u8) -> Result<()> {
        let volume = validate_volume(volume)?;
        *self.inner.volume.lock() = volume;
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        *self.inner.volume.lock()
    }

    /// Restart the file after each natural end. Cleared by [`stop`](Self::stop).
    pub fn set_loop(&self, looping: bool) {
        self.inner.looping.store(looping, Ordering::SeqCst);
    }

    /// File most recently handed to `play`.
    pub fn file(&self) -> Option<PathBuf> {
        self.inner.file.lock().clone()
    }

    pub fn running(&self) -> bool {
        self.inner.running()
    }

    /// Display name of the selected backend, once one was created.
    pub fn backend_name(&self) -> Option<&'static str> {
        self.inner
            .active
            .lock()
            .as_ref()
            .map(|adapter| adapter.name())
    }

    /// Time since the current run started, `None` while idle.
    pub fn elapsed(&self) -> Option<Duration> {
        if !self.running() {
            return None;
        }
        let started = *self.inner.started_at.lock();
        started.map(|at| at.elapsed())
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            volume: self.volume(),
            file: self.file(),
            running: self.running(),
        }
    }

    /// Subscribe to started/stopped/error events for this player.
    pub fn subscribe(&self) -> PlayerEventStream {
        self.inner.events.subscribe()
    }
}

// ============================================================================
// Lifecycle internals
// ============================================================================

impl PlayerInner {
    fn running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .map(|adapter| adapter.running())
            .unwrap_or(false)
    }

    /// Stop whatever runs, then launch `file`. Caller holds `ops`.
    async fn play_locked(&self, file: &Path) -> Result<()> {
        self.stop_active().await?;

        let adapter = self.ensure_adapter().await?;
        adapter.set_volume(*self.volume.lock());
        adapter.play(file).await?;

        *self.started_at.lock() = Some(Instant::now());
        self.run_epoch.fetch_add(1, Ordering::SeqCst);
        self.restart_armed.store(true, Ordering::SeqCst);
        // Emitting here, under the ops lock, keeps the public order
        // strictly Started-then-Stopped even when a stop follows
        // immediately; the adapter's own Started echo is dropped by the
        // forwarder.
        self.events.emit(PlayerEvent::Started);
        Ok(())
    }

    /// Stop the tracked run, if any. Caller holds `ops`.
    async fn stop_active(&self) -> Result<()> {
        self.restart_armed.store(false, Ordering::SeqCst);

        let adapter = self.active.lock().clone();
        let Some(adapter) = adapter else {
            return Ok(());
        };

        if !adapter.running() {
            // Adapter stops are idempotent; this emits nothing.
            return adapter.stop().await;
        }

        // The adapter echoes a Stopped for this command. Count it so the
        // forwarder absorbs the echo instead of treating it as a natural
        // end; the public event is emitted right here.
        if self.forwarding_started.load(Ordering::SeqCst) {
            self.expected_stops.fetch_add(1, Ordering::SeqCst);
        }
        if let Err(error) = adapter.stop().await {
            let _ = self
                .expected_stops
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            return Err(error);
        }

        *self.started_at.lock() = None;
        self.events.emit(PlayerEvent::Stopped);
        Ok(())
    }

    /// Return the adapter, creating it through the factory on first use,
    /// and make sure its events are being forwarded.
    async fn ensure_adapter(&self) -> Result<Arc<dyn MediaPlayer>> {
        let existing = self.active.lock().clone();
        let adapter = match existing {
            Some(adapter) => adapter,
            None => {
                let created: Arc<dyn MediaPlayer> =
                    Arc::from(self.factory.create_player().await?);
                *self.active.lock() = Some(Arc::clone(&created));
                created
            }
        };

        if !self.forwarding_started.swap(true, Ordering::SeqCst) {
            self.spawn_forwarder(adapter.subscribe());
        }
        Ok(adapter)
    }

    /// Pump adapter events into the player's channel until either side is
    /// dropped.
    fn spawn_forwarder(&self, mut events: PlayerEventStream) {
        let inner = self.weak_self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let Some(inner) = inner.upgrade() else { break };
                        inner.handle_adapter_event(event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "adapter event stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    async fn handle_adapter_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::Started => {
                // Already reported synchronously by play_locked.
            }
            PlayerEvent::Stopped => {
                if self.consume_expected_stop() {
                    // Echo of a commanded stop; already reported.
                    return;
                }
                if self.running() {
                    // A Stopped that outlived its run: a newer play is
                    // already up, so this end is history, not news.
                    return;
                }
                *self.started_at.lock() = None;
                self.events.emit(PlayerEvent::Stopped);
                self.maybe_restart().await;
            }
            PlayerEvent::Error(error) => {
                *self.started_at.lock() = None;
                self.events.emit(PlayerEvent::Error(error));
            }
        }
    }

    fn consume_expected_stop(&self) -> bool {
        self.expected_stops
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Restart after a natural end when the loop flag is set.
    ///
    /// The arming flag is consumed first, so one natural end triggers at
    /// most one restart and a commanded stop (which disarms) triggers none.
    /// The file is read only once `ops` is held: a restart must replay
    /// whatever is loaded at that point, and must yield entirely when a
    /// newer play won the lock first.
    async fn maybe_restart(&self) {
        if !self.restart_armed.swap(false, Ordering::SeqCst) {
            return;
        }
        if !self.looping.load(Ordering::SeqCst) {
            tracing::debug!("playback ended, loop not set, not restarting");
            return;
        }
        let observed_epoch = self.run_epoch.load(Ordering::SeqCst);

        let _guard = self.ops.lock().await;
        if self.run_epoch.load(Ordering::SeqCst) != observed_epoch || self.running() {
            tracing::debug!("loop restart superseded by a newer play");
            return;
        }
        let Some(file) = self.file.lock().clone() else {
            return;
        };

        tracing::debug!(file = %file.display(), "loop: restarting playback");
        if let Err(error) = self.play_locked(&file).await {
            self.events.emit(PlayerEvent::Error(Arc::new(error)));
        }
    }
}
