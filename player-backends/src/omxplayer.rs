//! OMXPlayer adapter for Raspberry Pi hosts.
//!
//! Volume travels in millibels (-5000..=0), video files need an explicit
//! `-b` to blank the framebuffer behind them, and stopping chases the
//! tracked pid with a `killall` because `omxplayer` is a wrapper script
//! whose actual player process (`omxplayer.bin`) can detach from the child
//! handle.

use crate::adapter::{AdapterCore, AdapterOptions};
use crate::process::{self, StdoutMode};
use async_trait::async_trait;
use player_traits::error::{PlayerError, Result};
use player_traits::events::PlayerEventStream;
use player_traits::playback::MediaPlayer;
use std::path::Path;
use std::sync::Arc;

const BINARY: &str = "omxplayer";

/// Process name the wrapper script hands playback to.
const PLAYER_PROCESS: &str = "omxplayer.bin";

/// Extensions played without video output; everything else gets `-b`.
const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

/// Media player backed by `omxplayer`.
///
/// Useful extra arguments include the audio/video routing switches, e.g.
/// `["-o", "both"]`, or the display selector on a Raspberry Pi 4
/// (`["--display", "2"]` for hdmi0, `["--display", "7"]` for hdmi1).
#[derive(Clone)]
pub struct OmxPlayer {
    core: Arc<AdapterCore>,
}

impl OmxPlayer {
    pub fn new(options: AdapterOptions) -> Self {
        Self {
            core: Arc::new(AdapterCore::new(options)),
        }
    }

    /// Whether `omxplayer --version` runs successfully on this host.
    pub async fn check_availability() -> bool {
        process::version_probe(BINARY).await
    }

    /// Universal volume in millibels: 0 maps to -5000, 100 to 0.
    fn millibels(volume: u8) -> i32 {
        i32::from(volume) * 50 - 5000
    }

    fn build_args(volume: u8, extra_args: &[String], file: &Path) -> Vec<String> {
        let mut args = vec![
            "-no-osd".to_string(),
            "--no-keys".to_string(),
            "--vol".to_string(),
            Self::millibels(volume).to_string(),
        ];

        if !is_audio_file(file) {
            // Video requires '-b'
            args.push("-b".to_string());
        }

        args.extend(extra_args.iter().cloned());
        args.push(file.display().to_string());
        args
    }
}

/// Whether the file's extension is on the audio whitelist.
///
/// Extensionless files count as video and get the framebuffer blank.
fn is_audio_file(file: &Path) -> bool {
    file.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|audio| ext.eq_ignore_ascii_case(audio))
        })
        .unwrap_or(false)
}

#[async_trait]
impl MediaPlayer for OmxPlayer {
    async fn play(&self, file: &Path) -> Result<()> {
        let args = Self::build_args(self.core.volume(), self.core.extra_args(), file);
        self.core.logger().debug(format!("Player args: {args:?}"));

        let mut child = match process::spawn_player(BINARY, &args, self.core.env(), StdoutMode::Capture)
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
        if let Some(stdout) = child.stdout.take() {
            let logger = self.core.logger().clone();
            process::drain_lines(stdout, move |line| logger.debug(line));
        }

        let this = self.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(_status) => {
                    this.core.logger().trace("Exited.");
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
            process::broadcast_interrupt(PLAYER_PROCESS).await;
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
