//! # Audio Probe Module
//!
//! Format detection and duration probing using the Symphonia library.
//!
//! ## Overview
//!
//! Playback never decodes samples itself: audible output (when enabled) is
//! delegated to `rodio`. What the player needs from Symphonia is the answer to
//! two questions asked at open time:
//!
//! 1. Is this file a playable audio file? (container + codec check)
//! 2. How long is it? (the lyric schedule is derived from the duration)
//!
//! ```text
//! Path → MediaSourceStream → FormatReader → track codec params → ProbeResult
//! ```
//!
//! When a container does not declare its frame count (some MP3 streams), the
//! probe scans packet durations to the end of the stream.

mod format_detector;
mod symphonia;

pub use self::symphonia::SymphoniaProbe;
pub use format_detector::FormatDetector;
