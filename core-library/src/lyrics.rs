//! Plain-text lyric loading.
//!
//! A lyric file holds one lyric line per text line. Blank lines are kept:
//! they take a slot in the schedule like any other line.

use crate::models::Song;
use core_runtime::config::SongEntry;
use core_runtime::logging::strip_path;
use std::path::Path;
use tracing::{debug, warn};

/// Read the lyric lines of `path`.
///
/// A missing or unreadable file is logged and yields no lines; the song is
/// still playable without lyrics.
pub async fn load_lyrics(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let lines: Vec<String> = content.lines().map(str::to_owned).collect();
            debug!(
                file = %strip_path(&path.to_string_lossy()),
                lines = lines.len(),
                "Loaded lyrics"
            );
            lines
        }
        Err(e) => {
            warn!(
                file = %strip_path(&path.to_string_lossy()),
                error = %e,
                "Error reading lyrics file"
            );
            Vec::new()
        }
    }
}

/// [`load_lyrics`] for songs whose lyric file is optional.
pub async fn load_optional_lyrics(path: Option<&Path>) -> Vec<String> {
    match path {
        Some(path) => load_lyrics(path).await,
        None => Vec::new(),
    }
}

/// Build a [`Song`] from a configuration entry, loading its lyrics.
pub async fn song_from_entry(entry: &SongEntry) -> Song {
    let lyrics = load_optional_lyrics(entry.lyrics.as_deref()).await;
    Song::new(entry.title.clone(), lyrics, entry.audio.clone())
}
