//! Probes the host, reports which playback backend the factory selects, and
//! optionally plays one file on the raw adapter (no orchestrator on top).
//!
//! Run with:
//!
//! ```sh
//! cargo run -p player-core --example factory_demo -- /path/to/clip.mp3 vlc mplayer
//! ```
//!
//! Both arguments are optional: with no file the demo only reports the
//! selection, and any further arguments override the preference order.

use player_core::{AvPlayerFactory, BackendKind, FactoryConfig, MediaPlayer, PlayerEvent};
use std::env;
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let file = args.next().map(PathBuf::from);
    let order = args
        .map(|name| name.parse::<BackendKind>())
        .collect::<Result<Vec<_>, _>>()?;

    // The configurator runs on every create_player call; here it switches on
    // console logging so the probe results are visible, and applies any
    // preference order given on the command line.
    let factory = AvPlayerFactory::with_configurator(move |config: FactoryConfig| {
        let order = order.clone();
        async move {
            let config = config.with_console_logger();
            if order.is_empty() {
                config
            } else {
                config.with_preferred_order(order)
            }
        }
    });

    let player = match factory.create_player().await {
        Ok(player) => player,
        Err(error) => {
            eprintln!("{error}");
            process::exit(1);
        }
    };
    println!("selected backend: {}", player.name());

    let Some(file) = file else {
        return Ok(());
    };
    let mut events = player.subscribe();
    player.play(&file).await?;

    loop {
        match events.recv().await {
            Ok(PlayerEvent::Started) => println!("playing {}", file.display()),
            Ok(PlayerEvent::Stopped) => {
                println!("stopped");
                break;
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
