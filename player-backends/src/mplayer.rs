//! MPlayer adapter.

use crate::adapter::{AdapterCore, AdapterOptions};
use crate::process::{self, StdoutMode};
use async_trait::async_trait;
use player_traits::error::{PlayerError, Result};
use player_traits::events::PlayerEventStream;
use player_traits::playback::MediaPlayer;
use std::path::Path;
use std::sync::Arc;

const BINARY: &str = "mplayer";

/// Media player backed by the classic `mplayer` binary.
///
/// The universal volume maps straight onto mplayer's own 0-100 scale, so it
/// is passed through unchanged.
#[derive(Clone)]
pub struct MPlayer {
    core: Arc<AdapterCore>,
}

impl MPlayer {
    pub fn new(options: AdapterOptions) -> Self {
        Self {
            core: Arc::new(AdapterCore::new(options)),
        }
    }

    /// Whether `mplayer` resolves on `PATH`.
    pub async fn check_availability() -> bool {
        process::binary_on_path(BINARY)
    }

    fn build_args(volume: u8, extra_args: &[String], file: &Path) -> Vec<String> {
        let mut args = vec![
            "-nogui".to_string(),
            "-display".to_string(),
            ":0".to_string(),
            "-fs".to_string(),
            "-volume".to_string(),
            volume.to_string(),
        ];
        args.extend(extra_args.iter().cloned());
        args.push(file.display().to_string());
        args
    }
}

#[async_trait]
impl MediaPlayer for MPlayer {
    async fn play(&self, file: &Path) -> Result<()> {
        let args = Self::build_args(self.core.volume(), self.core.extra_args(), file);

        // mplayer floods stdout; an unread pipe fills up and stalls
        // playback, so stdout is discarded at spawn time.
        let mut child = match process::spawn_player(BINARY, &args, self.core.env(), StdoutMode::Discard)
        {
            Ok(child) => child,
            Err(source) => {
                self.core.logger().error(format!("failed to run {BINARY}: {source}"));
                self.core.emit_error(PlayerError::SpawnFailed {
                    binary: BINARY,
                    source,
                });
                return Ok(());
            }
        };

        let pid = child.id().map(|pid| pid as i32);
        let generation = self.core.begin_session(pid);

        if let Some(stderr) = child.stderr.take() {
            let logger = self.core.logger().clone();
            process::drain_lines(stderr, move |line| logger.error(line));
        }

        let this = self.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(_status) => {
                    this.core.logger().debug("mplayer exited.");
                    if this.core.end_session(generation) {
                        this.core.emit_stopped();
                    }
                }
                Err(source) => {
                    this.core.logger().error(format!("wait on {BINARY} failed: {source}"));
                    if this.core.end_session(generation) {
                        this.core.emit_error(PlayerError::SpawnFailed {
                            binary: BINARY,
                            source,
                        });
                        this.core.emit_stopped();
                    }
                }
            }
        });

        self.core.emit_started();
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if let Some(active) = self.core.take_active() {
            if let Some(pid) = active.pid {
                process::interrupt(pid);
            }
            self.core.emit_stopped();
        }
        Ok(())
    }

    fn set_volume(&self, volume: u8) {
        self.core.set_volume(volume);
    }

    fn volume(&self) -> u8 {
        self.core.volume()
    }

    fn running(&self) -> bool {
        self.core.running()
    }

    fn name(&self) -> &'static str {
        BINARY
    }

    fn subscribe(&self) -> PlayerEventStream {
        self.core.subscribe()
    }
}
