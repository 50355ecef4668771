//! Plays a file with whichever backend is installed, printing events and
//! status snapshots.
//!
//! Run with:
//!
//! ```sh
//! cargo run -p player-core --example av_player_demo -- /path/to/clip.mp3 80 --loop
//! ```
//!
//! The volume argument, `--loop`, and `--backend <kind>` are optional.
//! With `--loop` the file restarts after every natural end until Ctrl-C;
//! `--backend` narrows the preference order to a single backend.

use player_core::{parse_volume, AvPlayer, BackendKind, FactoryConfig, PlayerEvent};
use std::env;
use std::process;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1);
    let mut file = None;
    let mut volume = None;
    let mut looping = false;
    let mut backend = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--loop" => looping = true,
            "--backend" => {
                let Some(name) = args.next() else {
                    eprintln!("--backend needs a value (omxplayer, vlc, cvlc, mplayer)");
                    process::exit(2);
                };
                backend = Some(name.parse::<BackendKind>()?);
            }
            other if file.is_none() => file = Some(other.to_string()),
            other => volume = Some(parse_volume(other)?),
        }
    }
    let Some(file) = file else {
        eprintln!("usage: av_player_demo <file> [volume] [--loop] [--backend <kind>]");
        process::exit(2);
    };

    let mut config = FactoryConfig::default().with_console_logger();
    if let Some(backend) = backend {
        config = config.with_preferred_order(vec![backend]);
    }
    let player = AvPlayer::with_config(config);
    let mut events = player.subscribe();

    if let Some(volume) = volume {
        player.set_volume(volume)?;
    }
    player.set_loop(looping);
    player.play(&file).await?;
    println!("backend: {}", player.backend_name().unwrap_or("unknown"));

    loop {
        match events.recv().await {
            Ok(PlayerEvent::Started) => {
                println!("status: {}", serde_json::to_string(&player.status())?);
            }
            Ok(PlayerEvent::Stopped) => {
                println!("stopped");
                if !looping {
                    break;
                }
            }
            Ok(PlayerEvent::Error(error)) => {
                eprintln!("playback error: {error}");
                break;
            }
            Err(_) => break,
        }
    }

    player.stop().await?;
    Ok(())
}
