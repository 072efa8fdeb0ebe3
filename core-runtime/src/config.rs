//! # Player Configuration Module
//!
//! Loads and validates the configuration for the song player.
//!
//! ## Overview
//!
//! The configuration is a TOML file listing the songs of the playlist together
//! with playback and logging settings. Song entries only carry paths: lyric
//! files are read by the library crate, audio files are opened at play time.
//! A missing lyric or audio file is therefore not a configuration error; a
//! missing or malformed configuration file is, and it is the only fatal
//! startup error.
//!
//! ## File format
//!
//! ```toml
//! [playback]
//! poll_interval_ms = 100
//!
//! [logging]
//! level = "info"
//! format = "compact"
//!
//! [[songs]]
//! title = "Beautiful Things"
//! lyrics = "lyrics/beautiful_things.txt"
//! audio = "music/beautiful_things.wav"
//! ```
//!
//! Relative paths are resolved against the directory containing the file.
//!
//! ## Usage
//!
//! ### Loading from disk
//!
//! ```ignore
//! use core_runtime::config::PlayerConfig;
//!
//! let config = PlayerConfig::load("songplayer.toml").await?;
//! for song in &config.songs {
//!     println!("{} -> {}", song.title, song.audio.display());
//! }
//! ```
//!
//! ### Building programmatically
//!
//! ```
//! use core_runtime::config::{PlayerConfig, SongEntry};
//!
//! let config = PlayerConfig::builder()
//!     .song(SongEntry::new("Dandelions", "music/dandelions.wav").with_lyrics("lyrics/dandelions.txt"))
//!     .poll_interval_ms(50)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.songs.len(), 1);
//! ```

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default interval between playback completion checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default buffer size of the event bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Default configuration file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "songplayer.toml";

/// Complete player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// Songs in play order.
    #[serde(default)]
    pub songs: Vec<SongEntry>,

    /// Playback tuning.
    #[serde(default)]
    pub playback: PlaybackSettings,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// One playlist entry: a title plus the lyric and audio file paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SongEntry {
    /// Display title, unique by convention.
    pub title: String,

    /// Plain-text lyrics file, one line per lyric line.
    #[serde(default)]
    pub lyrics: Option<PathBuf>,

    /// Audio file opened at play time. Left empty when the entry has no
    /// `audio` key; such a song fails when played.
    #[serde(default)]
    pub audio: PathBuf,
}

impl SongEntry {
    pub fn new(title: impl Into<String>, audio: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            lyrics: None,
            audio: audio.into(),
        }
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<PathBuf>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    fn resolve_against(&mut self, base_dir: &Path) {
        if self.audio.is_relative() && !self.audio.as_os_str().is_empty() {
            self.audio = base_dir.join(&self.audio);
        }
        if let Some(lyrics) = self.lyrics.as_mut() {
            if lyrics.is_relative() {
                *lyrics = base_dir.join(&*lyrics);
            }
        }
    }
}

/// Playback tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlaybackSettings {
    /// How often an active session checks whether playback completed.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Capacity of the event bus channel.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl PlaybackSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: LogLevel,

    /// Output format; the build-profile default is used when absent.
    #[serde(default)]
    pub format: Option<LogFormat>,

    /// Raw `EnvFilter` directives overriding `level`.
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingSettings {
    /// Convert into a [`LoggingConfig`] ready for `init_logging`.
    pub fn to_logging_config(&self) -> LoggingConfig {
        let mut config = LoggingConfig::default().with_level(self.level);
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter.clone());
        }
        config
    }
}

impl PlayerConfig {
    /// Creates a new builder for constructing a `PlayerConfig`.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Parse a configuration from TOML text.
    ///
    /// Relative song paths are resolved against `base_dir` when given.
    pub fn from_toml_str(content: &str, base_dir: Option<&Path>) -> Result<Self> {
        let mut config: PlayerConfig = toml::from_str(content)?;

        if let Some(base_dir) = base_dir {
            for song in &mut config.songs {
                song.resolve_against(base_dir);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading configuration");

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;

        let base_dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let config = Self::from_toml_str(&content, base_dir)?;

        info!(songs = config.songs.len(), "Configuration loaded");
        Ok(config)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Poll interval and event buffer size are non-zero
    /// - Every song has a non-empty title
    pub fn validate(&self) -> Result<()> {
        if self.playback.poll_interval_ms == 0 {
            return Err(Error::Config(
                "Poll interval must be greater than 0ms".to_string(),
            ));
        }

        if self.playback.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        for (index, song) in self.songs.iter().enumerate() {
            if song.title.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Song #{} has an empty title",
                    index + 1
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`PlayerConfig`].
#[derive(Debug, Default)]
pub struct PlayerConfigBuilder {
    songs: Vec<SongEntry>,
    poll_interval_ms: Option<u64>,
    event_buffer_size: Option<usize>,
    logging: Option<LoggingSettings>,
}

impl PlayerConfigBuilder {
    /// Append a song entry.
    pub fn song(mut self, song: SongEntry) -> Self {
        self.songs.push(song);
        self
    }

    pub fn poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = Some(interval_ms);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn logging(mut self, logging: LoggingSettings) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds and validates the final `PlayerConfig`.
    pub fn build(self) -> Result<PlayerConfig> {
        let config = PlayerConfig {
            songs: self.songs,
            playback: PlaybackSettings {
                poll_interval_ms: self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
                event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            },
            logging: self.logging.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [playback]
        poll_interval_ms = 50

        [logging]
        level = "debug"
        format = "json"

        [[songs]]
        title = "Beautiful Things"
        lyrics = "lyrics/beautiful_things.txt"
        audio = "music/beautiful_things.wav"

        [[songs]]
        title = "Iris w/out Lyrics"
        audio = "/abs/iris.wav"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = PlayerConfig::from_toml_str(SAMPLE, None).unwrap();

        assert_eq!(config.songs.len(), 2);
        assert_eq!(config.playback.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.playback.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, Some(LogFormat::Json));
        assert_eq!(config.songs[1].lyrics, None);
    }

    #[test]
    fn test_relative_paths_resolve_against_base_dir() {
        let config = PlayerConfig::from_toml_str(SAMPLE, Some(Path::new("/srv/player"))).unwrap();

        assert_eq!(
            config.songs[0].audio,
            PathBuf::from("/srv/player/music/beautiful_things.wav")
        );
        assert_eq!(
            config.songs[0].lyrics,
            Some(PathBuf::from("/srv/player/lyrics/beautiful_things.txt"))
        );
        assert_eq!(config.songs[1].audio, PathBuf::from("/abs/iris.wav"));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = PlayerConfig::from_toml_str("", None).unwrap();

        assert!(config.songs.is_empty());
        assert_eq!(config.playback, PlaybackSettings::default());
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = PlayerConfig::from_toml_str("[playback]\npoll_interval_ms = 0\n", None);

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Poll interval must be greater than 0ms"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = PlayerConfig::from_toml_str("[[songs]\ntitle = ", None);
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_builder_rejects_empty_title() {
        let result = PlayerConfig::builder()
            .song(SongEntry::new("   ", "a.wav"))
            .build();

        assert!(result.unwrap_err().to_string().contains("empty title"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = PlayerConfig::builder()
            .song(SongEntry::new("A", "a.wav").with_lyrics("a.txt"))
            .build()
            .unwrap();

        assert_eq!(config.playback.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.songs[0].lyrics, Some(PathBuf::from("a.txt")));
    }

    #[test]
    fn test_song_without_audio_is_kept_unresolved() {
        let config = PlayerConfig::from_toml_str(
            "[[songs]]\ntitle = \"No Audio\"\n",
            Some(Path::new("/srv/player")),
        )
        .unwrap();

        assert_eq!(config.songs[0].title, "No Audio");
        assert_eq!(config.songs[0].audio, PathBuf::new());
    }

    #[test]
    fn test_logging_settings_conversion() {
        let settings = LoggingSettings {
            level: LogLevel::Warn,
            format: Some(LogFormat::Compact),
            filter: Some("core_playback=trace".to_string()),
        };

        let logging = settings.to_logging_config();
        assert_eq!(logging.level, LogLevel::Warn);
        assert_eq!(logging.format, LogFormat::Compact);
        assert_eq!(logging.filter.as_deref(), Some("core_playback=trace"));
    }
}
