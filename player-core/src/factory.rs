//! # Backend Selection
//!
//! [`AvPlayerFactory`] probes the host once for every supported playback
//! binary, remembers the result, and hands out the first available backend
//! in the configured preference order.
//!
//! ## Overview
//!
//! - Probing runs at most once per factory and checks all binaries
//!   concurrently. `vlc` and `cvlc` share one probe because both resolve to
//!   the `cvlc` binary.
//! - An optional configurator callback is applied to the configuration at
//!   the start of every `create_player` call, so late decisions (reading a
//!   settings file, flipping the order per request) stay possible.
//! - When nothing in the preference order is installed, `create_player`
//!   fails with [`PlayerError::NoPlayersAvailable`].

use crate::config::FactoryConfig;
use futures_util::{future::BoxFuture, FutureExt};
use player_backends::{AdapterOptions, MPlayer, OmxPlayer, VlcPlayer};
use player_traits::error::{PlayerError, Result};
use player_traits::logging::PlayerLogger;
use player_traits::playback::MediaPlayer;
use player_traits::BackendKind;
use std::collections::HashMap;
use tokio::sync::{Mutex, OnceCell};

/// Scope under which probe results are logged.
const FACTORY_LOG_TARGET: &str = "AvPlayerFactory";

type Configurator = Box<dyn Fn(FactoryConfig) -> BoxFuture<'static, FactoryConfig> + Send + Sync>;

// ============================================================================
// Availability
// ============================================================================

/// Probe results per backend name.
///
/// Alias names are recorded together, so a successful `cvlc` probe answers
/// for both [`BackendKind::Vlc`] and [`BackendKind::Cvlc`].
#[derive(Debug, Clone, Default)]
pub struct AvailabilityMap {
    map: HashMap<BackendKind, bool>,
}

impl AvailabilityMap {
    /// Record one probe outcome under every name of the backend's family.
    pub fn record(&mut self, backend: BackendKind, available: bool) {
        match backend.canonical() {
            BackendKind::Vlc | BackendKind::Cvlc => {
                self.map.insert(BackendKind::Vlc, available);
                self.map.insert(BackendKind::Cvlc, available);
            }
            other => {
                self.map.insert(other, available);
            }
        }
    }

    /// Whether the backend's binary was found. Unprobed names count as
    /// unavailable.
    pub fn is_available(&self, backend: BackendKind) -> bool {
        self.map.get(&backend).copied().unwrap_or(false)
    }
}

/// Walk the preference order and return the first installed backend.
fn select_backend(order: &[BackendKind], availability: &AvailabilityMap) -> Option<BackendKind> {
    order
        .iter()
        .copied()
        .find(|backend| availability.is_available(*backend))
}

// ============================================================================
// Factory
// ============================================================================

/// Probes installed player binaries and constructs the preferred adapter.
///
/// The factory is cheap to share behind an `Arc` and safe to call from
/// multiple tasks; probing is memoized across calls.
///
/// ```no_run
/// use player_core::factory::AvPlayerFactory;
///
/// # async fn demo() -> player_traits::error::Result<()> {
/// let factory = AvPlayerFactory::new();
/// let player = factory.create_player().await?;
/// println!("selected {}", player.name());
/// # Ok(())
/// # }
/// ```
pub struct AvPlayerFactory {
    config: Mutex<FactoryConfig>,
    configurator: Option<Configurator>,
    availability: OnceCell<AvailabilityMap>,
}

impl Default for AvPlayerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AvPlayerFactory {
    /// Factory with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FactoryConfig::default())
    }

    /// Factory with a fixed, fully built configuration.
    pub fn with_config(config: FactoryConfig) -> Self {
        Self {
            config: Mutex::new(config),
            configurator: None,
            availability: OnceCell::new(),
        }
    }

    /// Factory whose configuration is (re)derived by a callback at the start
    /// of every [`create_player`](Self::create_player) call.
    ///
    /// The callback receives the current configuration and returns the one
    /// to use, which also becomes the stored configuration for the next
    /// call.
    pub fn with_configurator<F, Fut>(configurator: F) -> Self
    where
        F: Fn(FactoryConfig) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = FactoryConfig> + Send + 'static,
    {
        Self {
            config: Mutex::new(FactoryConfig::default()),
            configurator: Some(Box::new(move |config| configurator(config).boxed())),
            availability: OnceCell::new(),
        }
    }

    /// Select and construct the preferred available backend.
    ///
    /// Returns [`PlayerError::NoPlayersAvailable`] when no binary from the
    /// preference order is installed. Runtime failures of the constructed
    /// player are not reported here; subscribe to the adapter's events for
    /// those.
    pub async fn create_player(&self) -> Result<Box<dyn MediaPlayer>> {
        let config = self.effective_config().await;
        let logger = PlayerLogger::new(config.logger()).scoped(FACTORY_LOG_TARGET);

        let availability = self
            .availability
            .get_or_init(|| probe_availability(logger.clone()))
            .await;

        let selected = select_backend(config.preferred_order(), availability)
            .ok_or(PlayerError::NoPlayersAvailable)?;

        Ok(instantiate(selected, &config, &logger))
    }

    /// Apply the configurator (when present) and return a snapshot of the
    /// configuration to use for this call.
    async fn effective_config(&self) -> FactoryConfig {
        let mut config = self.config.lock().await;
        if let Some(configurator) = &self.configurator {
            *config = configurator(config.clone()).await;
        }
        config.clone()
    }
}

/// Probe every supported binary concurrently and log the outcomes.
async fn probe_availability(logger: PlayerLogger) -> AvailabilityMap {
    let (vlc, omx, mplayer) = tokio::join!(
        VlcPlayer::check_availability(),
        OmxPlayer::check_availability(),
        MPlayer::check_availability(),
    );

    let mut availability = AvailabilityMap::default();
    for (backend, available) in [
        (BackendKind::Vlc, vlc),
        (BackendKind::OmxPlayer, omx),
        (BackendKind::MPlayer, mplayer),
    ] {
        availability.record(backend, available);
        if available {
            logger.info(format!("\u{2713} {} is available.", backend.binary()));
        } else {
            logger.info(format!("\u{2717} {} not available.", backend.binary()));
        }
    }
    availability
}

/// Build the adapter for a selected backend.
fn instantiate(
    backend: BackendKind,
    config: &FactoryConfig,
    logger: &PlayerLogger,
) -> Box<dyn MediaPlayer> {
    let mut options = AdapterOptions::new(logger.scoped(backend.binary()))
        .with_extra_args(config.extra_args_for(backend).to_vec());
    if let Some(env) = config.env() {
        options = options.with_env(env.clone());
    }

    match backend {
        BackendKind::Vlc | BackendKind::Cvlc => Box::new(VlcPlayer::new(options)),
        BackendKind::OmxPlayer => Box::new(OmxPlayer::new(options)),
        BackendKind::MPlayer => Box::new(MPlayer::new(options)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn availability(entries: &[(BackendKind, bool)]) -> AvailabilityMap {
        let mut map = AvailabilityMap::default();
        for &(backend, available) in entries {
            map.record(backend, available);
        }
        map
    }

    #[test]
    fn test_select_backend_respects_order() {
        let map = availability(&[
            (BackendKind::Vlc, true),
            (BackendKind::MPlayer, true),
            (BackendKind::OmxPlayer, false),
        ]);

        let order = [BackendKind::OmxPlayer, BackendKind::MPlayer, BackendKind::Vlc];
        assert_eq!(select_backend(&order, &map), Some(BackendKind::MPlayer));
    }

    #[test]
    fn test_select_backend_skips_missing_entries() {
        // Only cvlc installed; a preference starting with mplayer still
        // lands on vlc.
        let map = availability(&[(BackendKind::Vlc, true), (BackendKind::MPlayer, false)]);

        let order = [BackendKind::MPlayer, BackendKind::Vlc];
        assert_eq!(select_backend(&order, &map), Some(BackendKind::Vlc));
    }

    #[test]
    fn test_select_backend_honors_vlc_alias() {
        let map = availability(&[(BackendKind::Cvlc, true)]);

        assert_eq!(
            select_backend(&[BackendKind::Vlc], &map),
            Some(BackendKind::Vlc)
        );
        assert_eq!(
            select_backend(&[BackendKind::Cvlc], &map),
            Some(BackendKind::Cvlc)
        );
    }

    #[test]
    fn test_select_backend_none_available() {
        let map = availability(&[(BackendKind::Vlc, false)]);
        let order = [BackendKind::OmxPlayer, BackendKind::Vlc, BackendKind::MPlayer];
        assert_eq!(select_backend(&order, &map), None);

        assert_eq!(select_backend(&order, &AvailabilityMap::default()), None);
    }

    #[tokio::test]
    async fn test_empty_preference_order_yields_no_players() {
        let factory = AvPlayerFactory::with_config(
            FactoryConfig::default().with_preferred_order(Vec::new()),
        );

        let error = factory.create_player().await.err();
        assert!(matches!(error, Some(PlayerError::NoPlayersAvailable)));
        assert_eq!(error.map(|e| e.to_string()).as_deref(), Some("No players available."));
    }

    #[tokio::test]
    async fn test_configurator_runs_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let factory = AvPlayerFactory::with_configurator(move |config: FactoryConfig| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                config.with_preferred_order(Vec::new())
            }
        });

        let first = factory.create_player().await;
        let second = factory.create_player().await;
        assert!(first.is_err());
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
