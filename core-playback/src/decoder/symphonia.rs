//! # Symphonia Probe Implementation
//!
//! Validates audio files and determines their duration with Symphonia.

use crate::decoder::format_detector::FormatDetector;
use crate::error::{PlaybackError, Result};
use crate::traits::{AudioCodec, AudioFormat, ProbeResult};
use core_runtime::logging::strip_path;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};
use tracing::{debug, error, instrument, warn};

/// Probes audio files for format and duration.
///
/// The probe walks the same pipeline the decoder would (container probe,
/// track selection, codec construction) so a file that probes successfully
/// is known to be playable.
pub struct SymphoniaProbe;

impl SymphoniaProbe {
    /// Probe the audio file at `path`.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NotFound`] if the file does not exist
    /// - [`PlaybackError::SourceError`] if it cannot be read
    /// - [`PlaybackError::InvalidFormat`] if the container is not recognized
    /// - [`PlaybackError::UnsupportedCodec`] if no decoder exists for the track
    #[instrument(skip_all, fields(file = %strip_path(&path.to_string_lossy())))]
    pub fn probe_file(path: &Path) -> Result<ProbeResult> {
        let file = File::open(path).map_err(|e| {
            error!("Failed to open audio file: {}", e);
            PlaybackError::from_open_error(path, e)
        })?;

        let hint = FormatDetector::hint_from_path(path);
        Self::probe_source(Box::new(file), hint)
    }

    /// Probe an arbitrary media source.
    pub fn probe_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<ProbeResult> {
        let mss = MediaSourceStream::new(source, Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!("Format probe failed: {}", e);
                map_probe_error(e)
            })?;

        let mut reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlaybackError::InvalidFormat("No audio tracks".to_string()))?;

        let track_id = track.id;
        let params = track.codec_params.clone();

        let codec = FormatDetector::detect_codec(params.codec);
        if codec == AudioCodec::Unknown {
            return Err(PlaybackError::UnsupportedCodec(format!("{:?}", params.codec)));
        }

        symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::UnsupportedCodec(e.to_string()))?;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| PlaybackError::InvalidFormat("Missing sample rate".to_string()))?;
        let channels = params.channels.map(|ch| ch.count() as u16);

        let duration = match params.n_frames {
            Some(frames) => frames_to_duration(frames, params.time_base, sample_rate),
            None => {
                debug!("Container does not declare a frame count, scanning packets");
                let frames = count_track_frames(reader.as_mut(), track_id)?;
                frames_to_duration(frames, params.time_base, sample_rate)
            }
        };

        debug!(?codec, sample_rate, ?channels, ?duration, "Probe complete");

        Ok(ProbeResult {
            format: AudioFormat {
                codec,
                sample_rate,
                channels,
            },
            duration,
        })
    }
}

fn map_probe_error(err: SymphoniaError) -> PlaybackError {
    match err {
        SymphoniaError::IoError(e) if e.kind() != std::io::ErrorKind::UnexpectedEof => {
            PlaybackError::SourceError(e.to_string())
        }
        SymphoniaError::Unsupported(what) => {
            PlaybackError::InvalidFormat(format!("unsupported: {}", what))
        }
        other => PlaybackError::InvalidFormat(other.to_string()),
    }
}

/// Sum packet durations of `track_id` until the end of the stream.
fn count_track_frames(reader: &mut dyn FormatReader, track_id: u32) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        match reader.next_packet() {
            Ok(packet) if packet.track_id() == track_id => total += packet.dur,
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => {
                warn!("Track list changed while scanning, using partial duration");
                break;
            }
            Err(e) => {
                return Err(PlaybackError::InvalidFormat(format!(
                    "Failed to read packet: {}",
                    e
                )))
            }
        }
    }

    Ok(total)
}

fn frames_to_duration(frames: u64, time_base: Option<TimeBase>, sample_rate: u32) -> Duration {
    match time_base {
        Some(time_base) => time_to_duration(time_base.calc_time(frames)),
        None if sample_rate > 0 => Duration::from_secs_f64(frames as f64 / sample_rate as f64),
        None => Duration::ZERO,
    }
}

fn time_to_duration(time: Time) -> Duration {
    Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac)
}
