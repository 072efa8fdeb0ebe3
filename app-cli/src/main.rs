//! `songplayer`: plays a configured playlist while printing synchronized
//! lyrics.

mod cli;
mod menu;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use core_library::{song_from_entry, Playlist};
use core_playback::{default_backend, ChannelLyricSink, PlaybackConfig};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{EventBus, EventSeverity, EventStream, RecvError};
use core_runtime::logging::init_logging;
use menu::Menu;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = PlayerConfig::load(&args.config)
        .await
        .with_context(|| {
            format!(
                "Error reading configuration file: {}",
                args.config.display()
            )
        })?;

    let mut logging = config.logging.to_logging_config();
    if let Some(level) = args.log_level {
        logging = logging.with_level(level);
    }
    if let Some(format) = args.log_format {
        logging = logging.with_format(format);
    }
    init_logging(logging).context("Failed to initialize logging")?;

    info!(
        config = %args.config.display(),
        songs = config.songs.len(),
        silent = args.silent,
        "Starting song player"
    );

    let bus = EventBus::new(config.playback.event_buffer_size);
    tokio::spawn(log_events(bus.stream()));

    let (sink, lyrics) = ChannelLyricSink::channel();
    let mut playlist = Playlist::new(default_backend(args.silent), Arc::new(sink))
        .with_config(PlaybackConfig::from(&config.playback))
        .with_event_bus(bus);

    let mut stdout = io::stdout();
    for entry in &config.songs {
        let song = song_from_entry(entry).await;
        writeln!(stdout, "Song \"{}\" added to playlist.", song.title())?;
        playlist.add(song);
    }

    Menu::new(playlist, lyrics, BufReader::new(tokio::io::stdin()), stdout)
        .run()
        .await
        .context("Terminal I/O failed")?;

    info!("Song player exited");
    Ok(())
}

/// Mirror bus events into the log at their own severity.
async fn log_events(mut events: EventStream) {
    loop {
        match events.recv().await {
            Ok(event) => match event.severity() {
                EventSeverity::Debug => debug!(?event, "{}", event.description()),
                EventSeverity::Info => info!(?event, "{}", event.description()),
                EventSeverity::Warning => warn!(?event, "{}", event.description()),
                EventSeverity::Error => error!(?event, "{}", event.description()),
            },
            Err(RecvError::Lagged(missed)) => warn!(missed, "Event log fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
