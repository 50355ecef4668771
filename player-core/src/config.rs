//! # Factory Configuration
//!
//! A [`FactoryConfig`] carries everything backend selection needs: the
//! preference order, per-backend argument overrides, an optional custom
//! process environment, and the logger sink. It is built with chainable
//! `with_*` setters and handed to
//! [`AvPlayerFactory`](crate::factory::AvPlayerFactory) either directly or
//! from a configurator callback.
//!
//! ## Usage
//!
//! ```
//! use player_core::config::FactoryConfig;
//! use player_traits::BackendKind;
//!
//! let config = FactoryConfig::default()
//!     .with_preferred_order(vec![BackendKind::Vlc, BackendKind::MPlayer])
//!     .with_extra_args(BackendKind::OmxPlayer, vec!["-o".into(), "both".into()])
//!     .with_console_logger();
//! ```

use player_traits::logging::{ConsoleLogger, LoggerSink, NoopLogger};
use player_traits::BackendKind;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Order walked when no preference is configured.
pub const DEFAULT_PREFERRED_ORDER: [BackendKind; 3] = [
    BackendKind::OmxPlayer,
    BackendKind::Vlc,
    BackendKind::MPlayer,
];

/// Settings consumed by one `create_player` call.
///
/// The configuration is read once at selection time; changing it afterwards
/// does not affect an adapter that was already constructed.
#[derive(Clone)]
pub struct FactoryConfig {
    preferred_order: Vec<BackendKind>,
    extra_args: HashMap<BackendKind, Vec<String>>,
    env: Option<HashMap<String, String>>,
    logger: Arc<dyn LoggerSink>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            preferred_order: DEFAULT_PREFERRED_ORDER.to_vec(),
            extra_args: HashMap::new(),
            env: None,
            logger: Arc::new(NoopLogger),
        }
    }
}

impl FactoryConfig {
    /// Replace the backend preference order. The first available entry wins;
    /// backends missing from the list are never selected.
    pub fn with_preferred_order(mut self, order: Vec<BackendKind>) -> Self {
        self.preferred_order = order;
        self
    }

    /// Extra arguments for one backend, inserted after the backend's fixed
    /// arguments and before the file path.
    ///
    /// Aliased backend names share storage: configuring `vlc` also covers
    /// `cvlc`.
    pub fn with_extra_args(mut self, backend: BackendKind, args: Vec<String>) -> Self {
        self.extra_args.insert(backend.canonical(), args);
        self
    }

    /// Wholesale replacement environment for spawned subprocesses.
    ///
    /// The map is passed verbatim; when inherit-plus-override behavior is
    /// wanted, build the map from [`std::env::vars`] first.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Install a caller-supplied logger sink.
    pub fn with_logger(mut self, logger: Arc<dyn LoggerSink>) -> Self {
        self.logger = logger;
        self
    }

    /// Install the built-in console logger.
    pub fn with_console_logger(self) -> Self {
        self.with_logger(Arc::new(ConsoleLogger::default()))
    }

    pub fn preferred_order(&self) -> &[BackendKind] {
        &self.preferred_order
    }

    pub fn extra_args_for(&self, backend: BackendKind) -> &[String] {
        self.extra_args
            .get(&backend.canonical())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn env(&self) -> Option<&HashMap<String, String>> {
        self.env.as_ref()
    }

    pub fn logger(&self) -> Arc<dyn LoggerSink> {
        Arc::clone(&self.logger)
    }
}

impl fmt::Debug for FactoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryConfig")
            .field("preferred_order", &self.preferred_order)
            .field("extra_args", &self.extra_args)
            .field("env", &self.env)
            .finish()
    }
}
