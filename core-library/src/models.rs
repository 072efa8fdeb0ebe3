//! Domain models for the playlist

use core_playback::PlaybackRequest;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A playable song: title, lyric lines and audio file.
///
/// Immutable once built. Lyrics are shared with the sessions that play the
/// song, so cloning a `Song` does not copy them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    title: String,
    lyrics: Arc<[String]>,
    audio_path: PathBuf,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        lyrics: impl Into<Arc<[String]>>,
        audio_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            lyrics: lyrics.into(),
            audio_path: audio_path.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lyrics(&self) -> &[String] {
        &self.lyrics
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    /// Build the request a playback session needs for this song.
    pub fn to_request(&self) -> PlaybackRequest {
        PlaybackRequest::new(
            self.title.clone(),
            self.audio_path.clone(),
            Arc::clone(&self.lyrics),
        )
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shares_lyrics() {
        let song = Song::new("Iris", vec!["a".to_string(), "b".to_string()], "iris.wav");
        let request = song.to_request();

        assert_eq!(request.title, "Iris");
        assert_eq!(request.audio_path, PathBuf::from("iris.wav"));
        assert_eq!(&*request.lyrics, song.lyrics());
        assert_eq!(song.to_string(), "Iris");
    }

    #[test]
    fn test_song_without_lyrics() {
        let song = Song::new("Instrumental", Vec::<String>::new(), "inst.wav");
        assert!(song.lyrics().is_empty());
    }
}
