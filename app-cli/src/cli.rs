//! Command-line arguments

use clap::Parser;
use core_runtime::config::DEFAULT_CONFIG_FILE;
use core_runtime::logging::{LogFormat, LogLevel};
use std::path::PathBuf;

/// Plays a playlist of local songs, printing each lyric line as it comes due.
#[derive(Parser, Debug)]
#[command(name = "songplayer", version, about)]
pub struct Args {
    /// Playlist configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Minimum log level, overriding the configuration file
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Log output format (pretty, json, compact)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Do not open an audio device; advance songs on the wall clock only
    #[arg(long)]
    pub silent: bool,
}
