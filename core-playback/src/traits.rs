//! # Core Playback Traits
//!
//! The abstractions the playback session is built on.
//!
//! ## Architecture
//!
//! - **AudioBackend** opens an audio file and hands out an [`AudioHandle`].
//!   Opening may touch the filesystem and the decoder, so it is async.
//! - **AudioHandle** is the opened resource: start, stop, report position and
//!   duration, and finally `close`. These calls are cheap and synchronous.
//! - **LyricSink** receives lyric lines when they fall due.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use core_playback::{AudioBackend, ClockBackend};
//! use std::path::Path;
//!
//! # async fn example() -> core_playback::Result<()> {
//! let backend = ClockBackend::new();
//! let mut handle = backend.open(Path::new("/music/song.wav")).await?;
//! handle.start()?;
//! println!("{} / {} us", handle.position_micros(), handle.duration_micros());
//! handle.stop();
//! handle.close();
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Audio Format Types
// ============================================================================

/// Audio codecs recognised by the probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// MPEG-1 Audio Layer 3
    Mp3,
    /// Advanced Audio Coding (AAC/M4A)
    Aac,
    /// Free Lossless Audio Codec
    Flac,
    /// Ogg Vorbis
    Vorbis,
    /// Opus (low-latency codec)
    Opus,
    /// PCM in a WAV/AIFF container
    Wav,
    /// Apple Lossless Audio Codec
    Alac,
    /// Codec not recognized
    Unknown,
}

/// Format of an audio file as reported by the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub codec: AudioCodec,
    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of audio channels, when the container declares it
    pub channels: Option<u16>,
}

/// Result of probing an audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub format: AudioFormat,
    /// Total duration of the audio stream
    pub duration: Duration,
}

impl ProbeResult {
    pub fn duration_micros(&self) -> u64 {
        duration_to_micros(self.duration)
    }
}

pub(crate) fn duration_to_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

// ============================================================================
// Requests and Lyric Lines
// ============================================================================

/// What a playback session needs to know about the song it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub title: String,
    pub audio_path: PathBuf,
    /// Lyric lines in display order, possibly empty.
    pub lyrics: Arc<[String]>,
}

impl PlaybackRequest {
    pub fn new(
        title: impl Into<String>,
        audio_path: impl Into<PathBuf>,
        lyrics: impl Into<Arc<[String]>>,
    ) -> Self {
        Self {
            title: title.into(),
            audio_path: audio_path.into(),
            lyrics: lyrics.into(),
        }
    }
}

/// A lyric line that reached its fire offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// 0-based position of the line in the song's lyrics.
    pub index: usize,
    /// Elapsed playback time at which the line was due (microseconds).
    pub offset_micros: u64,
    pub text: String,
}

// ============================================================================
// Core Traits
// ============================================================================

/// Opens audio files for playback.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Open the audio file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the file is missing, unreadable or in an
    /// unsupported format, and a playback error if the output device cannot
    /// be acquired.
    async fn open(&self, path: &Path) -> Result<Box<dyn AudioHandle>>;
}

/// An opened audio resource.
///
/// `position_micros` is non-decreasing while playing and equals the duration
/// once playback completes. `duration_micros` is fixed after open.
pub trait AudioHandle: Send {
    /// Begin playback from position 0.
    fn start(&mut self) -> Result<()>;

    /// Halt playback immediately. Idempotent.
    fn stop(&mut self);

    /// Release the resource. Consumes the handle, so it happens exactly once.
    fn close(self: Box<Self>);

    fn position_micros(&self) -> u64;

    fn duration_micros(&self) -> u64;

    /// Whether playback reached the end.
    fn is_finished(&self) -> bool {
        self.position_micros() >= self.duration_micros()
    }
}

/// Output channel for lyric lines.
///
/// `emit` is called from the scheduler task and must not block for long.
pub trait LyricSink: Send + Sync {
    fn emit(&self, line: &LyricLine);
}

// ============================================================================
// Tests
// ============================================================================
