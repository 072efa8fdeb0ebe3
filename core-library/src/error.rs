use core_playback::PlaybackError;
use thiserror::Error;

/// Reasons a playlist navigation request was refused.
///
/// None of these change the cursor or the active session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Invalid song number.")]
    InvalidIndex { requested: usize, len: usize },

    #[error("Song \"{0}\" not found in playlist.")]
    TitleNotFound(String),

    #[error("End of playlist reached.")]
    EndOfPlaylist,

    #[error("Beginning of playlist reached.")]
    BeginningOfPlaylist,

    #[error("No song is currently playing.")]
    NoCurrentSong,

    #[error("Playlist is empty.")]
    EmptyPlaylist,
}

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("Error playing song: {0}")]
    Playback(#[from] PlaybackError),
}

impl LibraryError {
    /// Returns `true` for refused navigation requests, as opposed to
    /// playback failures.
    pub fn is_navigation(&self) -> bool {
        matches!(self, LibraryError::Navigation(_))
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
