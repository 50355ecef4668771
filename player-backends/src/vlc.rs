//! VLC-family adapter.
//!
//! Drives the VLC command-line interface (`cvlc`). Volume travels as a gain
//! factor between 0.0 and 2.0, and stderr is scanned for the two failure
//! lines VLC prints instead of exiting non-zero.

use crate::adapter::{AdapterCore, AdapterOptions};
use crate::process::{self, StdoutMode};
use async_trait::async_trait;
use player_traits::error::{PlayerError, Result};
use player_traits::events::PlayerEventStream;
use player_traits::playback::MediaPlayer;
use std::path::Path;
use std::sync::Arc;

const BINARY: &str = "cvlc";

/// Media player backed by the VLC command-line interface.
///
/// Cloning shares the same supervised subprocess and event channel.
///
/// # Example
///
/// ```no_run
/// use player_backends::{AdapterOptions, VlcPlayer};
/// use player_traits::MediaPlayer;
/// use std::path::Path;
///
/// # async fn demo() -> player_traits::Result<()> {
/// let player = VlcPlayer::new(AdapterOptions::default());
/// let _events = player.subscribe();
/// player.set_volume(80);
/// player.play(Path::new("intro.mp4")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VlcPlayer {
    core: Arc<AdapterCore>,
}

impl VlcPlayer {
    pub fn new(options: AdapterOptions) -> Self {
        Self {
            core: Arc::new(AdapterCore::new(options)),
        }
    }

    /// Whether `cvlc --version` runs successfully on this host.
    pub async fn check_availability() -> bool {
        process::version_probe(BINARY).await
    }

    /// Universal volume as VLC's gain factor (0.0 to 2.0).
    fn gain(volume: u8) -> f64 {
        f64::from(volume) / 100.0 * 2.0
    }

    fn build_args(volume: u8, extra_args: &[String], file: &Path) -> Vec<String> {
        let mut args = vec![
            "--play-and-exit".to_string(),
            format!("--gain={}", Self::gain(volume)),
            "--no-video-title-show".to_string(),
        ];
        args.extend(extra_args.iter().cloned());
        args.push("-f".to_string());
        args.push(file.display().to_string());
        args
    }

    fn handle_stderr_line(&self, line: String, generation: u64) {
        self.core.logger().error(line.as_str());

        if let Some(error) = classify_stderr_line(&line) {
            // Only the session the line belongs to may be torn down.
            if let Some(active) = self.core.take_active_if(generation) {
                self.core.emit_error(error);
                if let Some(pid) = active.pid {
                    process::interrupt(pid);
                }
                self.core.emit_stopped();
            }
        }
    }
}

/// Map a stderr line to the domain error it reports, if any.
fn classify_stderr_line(line: &str) -> Option<PlayerError> {
    if line.contains("cannot open file") {
        return Some(PlayerError::FileNotOpenable {
            detail: line.trim().to_string(),
        });
    }
    if line.contains("window not available") {
        return Some(PlayerError::DisplayUnavailable {
            detail: line.trim().to_string(),
        });
    }
    None
}

#[async_trait]
impl MediaPlayer for VlcPlayer {
    async fn play(&self, file: &Path) -> Result<()> {
        let args = Self::build_args(self.core.volume(), self.core.extra_args(), file);

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
            let this = self.clone();
            process::drain_lines(stderr, move |line| this.handle_stderr_line(line, generation));
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_gain_boundaries() {
        assert_eq!(VlcPlayer::gain(0), 0.0);
        assert_eq!(VlcPlayer::gain(50), 1.0);
        assert_eq!(VlcPlayer::gain(100), 2.0);
    }

    #[test]
    fn test_gain_formats_like_a_plain_number() {
        // The gain travels on the command line; the shortest representation
        // is what the binary sees.
        assert_eq!(format!("--gain={}", VlcPlayer::gain(100)), "--gain=2");
        assert_eq!(format!("--gain={}", VlcPlayer::gain(75)), "--gain=1.5");
        assert_eq!(format!("--gain={}", VlcPlayer::gain(1)), "--gain=0.02");
    }

    #[test]
    fn test_build_args_default() {
        let args = VlcPlayer::build_args(100, &[], &PathBuf::from("/media/intro.mp4"));
        assert_eq!(
            args,
            [
                "--play-and-exit",
                "--gain=2",
                "--no-video-title-show",
                "-f",
                "/media/intro.mp4",
            ]
        );
    }

    #[test]
    fn test_build_args_extra_args_go_before_the_file() {
        let extra = vec!["--aout=alsa".to_string()];
        let args = VlcPlayer::build_args(50, &extra, &PathBuf::from("a.mp3"));
        assert_eq!(
            args,
            [
                "--play-and-exit",
                "--gain=1",
                "--no-video-title-show",
                "--aout=alsa",
                "-f",
                "a.mp3",
            ]
        );
    }

    #[test]
    fn test_stderr_classification() {
        let unreadable =
            classify_stderr_line("[0x7f] filesystem stream error: cannot open file /x.mp4").unwrap();
        assert!(unreadable.is_playback());
        assert!(matches!(unreadable, PlayerError::FileNotOpenable { .. }));

        let headless =
            classify_stderr_line("[0x7f] xcb window error: window not available").unwrap();
        assert!(matches!(headless, PlayerError::DisplayUnavailable { .. }));

        assert!(classify_stderr_line("main playlist: end of playlist").is_none());
    }

    #[test]
    fn test_name_and_defaults() {
        let player = VlcPlayer::new(AdapterOptions::default());
        assert_eq!(player.name(), "cvlc");
        assert!(!player.running());
        assert_eq!(player.volume(), crate::adapter::DEFAULT_ADAPTER_VOLUME);
    }
}
