//! # Playback Module
//!
//! Plays one song at a time while emitting its lyric lines in step with the
//! audio.
//!
//! ## Overview
//!
//! This crate handles:
//! - The audio primitive ([`AudioBackend`] / [`AudioHandle`]) and its
//!   implementations: a silent clock-driven output and, behind the
//!   `rodio-output` feature, audible output through `rodio`
//! - Format validation and duration probing with symphonia
//! - The [`LyricScheduler`], which spreads lyric lines evenly over the song
//! - The [`PlaybackSession`], which ties audio and lyrics together and
//!   guarantees teardown

pub mod config;
pub mod decoder;
pub mod error;
pub mod output;
pub mod scheduler;
pub mod session;
pub mod sinks;
pub mod traits;

pub use config::{PlaybackConfig, SessionOutcome, SessionState};
pub use decoder::{FormatDetector, SymphoniaProbe};
pub use error::{ErrorKind, PlaybackError, Result};
pub use output::{default_backend, ClockBackend, ClockHandle};
#[cfg(feature = "rodio-output")]
pub use output::{RodioBackend, RodioHandle};
pub use scheduler::{compute_schedule, LyricScheduleEntry, LyricScheduler};
pub use session::PlaybackSession;
pub use sinks::{ChannelLyricSink, ConsoleLyricSink};
pub use traits::{
    AudioBackend, AudioCodec, AudioFormat, AudioHandle, LyricLine, LyricSink, PlaybackRequest,
    ProbeResult,
};
