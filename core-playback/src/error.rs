//! # Playback Error Types
//!
//! Error types for opening, starting and tearing down audio playback.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`PlaybackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The audio file is missing, unreadable or not decodable.
    Resource,
    /// The output device or the playback machinery failed.
    Playback,
}

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Audio file does not exist.
    #[error("Audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to open or read the audio file.
    #[error("Failed to open audio source: {0}")]
    SourceError(String),

    /// Audio format is not recognized or cannot be parsed.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// Codec is not supported by the decoder.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// Platform audio device is unavailable.
    #[error("Audio device unavailable: {0}")]
    AudioDeviceUnavailable(String),

    /// Playback could not be started.
    #[error("Playback operation failed: {0}")]
    PlaybackFailed(String),

    /// The session was driven out of order (e.g. waiting before opening).
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Playback configuration is invalid.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Classify the error as a resource or a playback failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::NotFound(_)
            | PlaybackError::SourceError(_)
            | PlaybackError::InvalidFormat(_)
            | PlaybackError::UnsupportedCodec(_)
            | PlaybackError::IoError(_) => ErrorKind::Resource,
            PlaybackError::AudioDeviceUnavailable(_)
            | PlaybackError::PlaybackFailed(_)
            | PlaybackError::InvalidState(_)
            | PlaybackError::InvalidConfig(_)
            | PlaybackError::Internal(_) => ErrorKind::Playback,
        }
    }

    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::AudioDeviceUnavailable(_) | PlaybackError::PlaybackFailed(_)
        )
    }

    /// Map an I/O error raised while opening `path`.
    pub(crate) fn from_open_error(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            PlaybackError::NotFound(path.to_path_buf())
        } else {
            PlaybackError::SourceError(format!("{}: {}", path.display(), err))
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
