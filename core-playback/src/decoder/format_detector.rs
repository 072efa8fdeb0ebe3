//! # Format Detection Module
//!
//! Probe hints and codec classification on top of Symphonia's probe system.

use crate::traits::AudioCodec;
use std::path::Path;
use symphonia::core::codecs::CodecType;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Format detector for audio files.
pub struct FormatDetector;

impl FormatDetector {
    /// Create a probe hint from the file extension.
    ///
    /// ```rust
    /// use core_playback::FormatDetector;
    /// use std::path::Path;
    ///
    /// let _hint = FormatDetector::hint_from_path(Path::new("/music/song.mp3"));
    /// ```
    pub fn hint_from_path(path: &Path) -> Hint {
        let mut hint = Hint::new();

        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            debug!(extension, "Setting probe hint extension");
            hint.with_extension(extension);
        } else {
            debug!("No file extension found, probe will auto-detect");
        }

        hint
    }

    /// Convert Symphonia's `CodecType` to [`AudioCodec`].
    pub fn detect_codec(codec_type: CodecType) -> AudioCodec {
        use symphonia::core::codecs::*;

        if codec_type == CODEC_TYPE_MP3 {
            AudioCodec::Mp3
        } else if codec_type == CODEC_TYPE_AAC {
            AudioCodec::Aac
        } else if codec_type == CODEC_TYPE_FLAC {
            AudioCodec::Flac
        } else if codec_type == CODEC_TYPE_VORBIS {
            AudioCodec::Vorbis
        } else if codec_type == CODEC_TYPE_OPUS {
            AudioCodec::Opus
        } else if codec_type == CODEC_TYPE_ALAC {
            AudioCodec::Alac
        } else if [
            CODEC_TYPE_PCM_U8,
            CODEC_TYPE_PCM_S16LE,
            CODEC_TYPE_PCM_S16BE,
            CODEC_TYPE_PCM_S24LE,
            CODEC_TYPE_PCM_S24BE,
            CODEC_TYPE_PCM_S32LE,
            CODEC_TYPE_PCM_S32BE,
            CODEC_TYPE_PCM_F32LE,
            CODEC_TYPE_PCM_F32BE,
            CODEC_TYPE_PCM_F64LE,
            CODEC_TYPE_PCM_F64BE,
        ]
        .contains(&codec_type)
        {
            AudioCodec::Wav
        } else {
            warn!("Unknown codec type: {:?}", codec_type);
            AudioCodec::Unknown
        }
    }
}
