//! # Playlist
//!
//! An ordered list of songs with a cursor and at most one active playback
//! session.
//!
//! ## Navigation
//!
//! Every operation that starts a song first stops the active session and
//! waits for its teardown, then moves the cursor, then opens the new session.
//! Opening happens on the caller's task so open errors are returned directly;
//! once playing, the session waits for completion on its own task.
//!
//! Refused requests ([`NavigationError`]) leave both the cursor and the
//! active session untouched.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core_library::{Playlist, Song};
//! use core_playback::{ClockBackend, ConsoleLyricSink};
//! use std::sync::Arc;
//!
//! # async fn example() -> core_library::Result<()> {
//! let mut playlist = Playlist::new(Arc::new(ClockBackend::new()), Arc::new(ConsoleLyricSink));
//! playlist.add(Song::new("Iris", vec!["And I'd give up forever to touch you".to_string()], "iris.wav"));
//!
//! playlist.play_by_index(1).await?;
//! playlist.wait_until_finished().await;
//! # Ok(())
//! # }
//! ```

use crate::error::{LibraryError, NavigationError, Result};
use crate::models::Song;
use core_playback::{
    AudioBackend, LyricSink, PlaybackConfig, PlaybackSession, SessionOutcome,
};
use core_runtime::events::{CoreEvent, EventBus, PlaylistEvent};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// The session currently playing, owned by the playlist.
struct ActiveSession {
    stop: CancellationToken,
    task: JoinHandle<core_playback::Result<SessionOutcome>>,
    index: usize,
}

/// Ordered songs plus a cursor and the active session.
pub struct Playlist {
    songs: Vec<Song>,
    cursor: Option<usize>,
    active: Option<ActiveSession>,
    backend: Arc<dyn AudioBackend>,
    sink: Arc<dyn LyricSink>,
    config: PlaybackConfig,
    events: Option<EventBus>,
}

impl Playlist {
    pub fn new(backend: Arc<dyn AudioBackend>, sink: Arc<dyn LyricSink>) -> Self {
        Self {
            songs: Vec::new(),
            cursor: None,
            active: None,
            backend,
            sink,
            config: PlaybackConfig::default(),
            events: None,
        }
    }

    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish playlist and playback events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    // ========================================================================
    // Contents
    // ========================================================================

    /// Append `song` and return its 0-based index.
    pub fn add(&mut self, song: Song) -> usize {
        let index = self.songs.len();
        debug!(index, title = song.title(), "Song added");
        self.publish(PlaylistEvent::SongAdded {
            index,
            title: song.title().to_string(),
        });
        self.songs.push(song);
        index
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// Titles in play order.
    pub fn list(&self) -> impl Iterator<Item = &str> + '_ {
        self.songs.iter().map(Song::title)
    }

    /// Titles with their 1-based numbers, as accepted by [`play_by_index`].
    ///
    /// [`play_by_index`]: Playlist::play_by_index
    pub fn list_numbered(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.songs
            .iter()
            .enumerate()
            .map(|(index, song)| (index + 1, song.title()))
    }

    // ========================================================================
    // State
    // ========================================================================

    /// 0-based index of the current song, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Song> {
        self.cursor.and_then(|index| self.songs.get(index))
    }

    /// Returns `true` while a session is playing.
    pub fn is_playing(&self) -> bool {
        self.active
            .as_ref()
            .map(|active| !active.task.is_finished())
            .unwrap_or(false)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Play the first song whose title equals `title` exactly.
    #[instrument(skip(self))]
    pub async fn play_by_title(&mut self, title: &str) -> Result<&Song> {
        let index = self
            .songs
            .iter()
            .position(|song| song.title() == title)
            .ok_or_else(|| NavigationError::TitleNotFound(title.to_string()))?;

        self.play_at(index).await
    }

    /// Play song number `number` (1-based).
    #[instrument(skip(self))]
    pub async fn play_by_index(&mut self, number: usize) -> Result<&Song> {
        if number == 0 || number > self.songs.len() {
            return Err(NavigationError::InvalidIndex {
                requested: number,
                len: self.songs.len(),
            }
            .into());
        }

        self.play_at(number - 1).await
    }

    /// Play the song after the cursor, or the first song if there is none.
    #[instrument(skip(self))]
    pub async fn next(&mut self) -> Result<&Song> {
        if self.songs.is_empty() {
            return Err(NavigationError::EmptyPlaylist.into());
        }

        let index = self.cursor.map_or(0, |cursor| cursor + 1);
        if index >= self.songs.len() {
            self.publish(PlaylistEvent::EndReached);
            return Err(NavigationError::EndOfPlaylist.into());
        }

        self.play_at(index).await
    }

    /// Play the song before the cursor.
    #[instrument(skip(self))]
    pub async fn previous(&mut self) -> Result<&Song> {
        if self.songs.is_empty() {
            return Err(NavigationError::EmptyPlaylist.into());
        }

        let Some(index) = self.cursor.and_then(|cursor| cursor.checked_sub(1)) else {
            self.publish(PlaylistEvent::BeginningReached);
            return Err(NavigationError::BeginningOfPlaylist.into());
        };

        self.play_at(index).await
    }

    /// Play the current song again from the start.
    #[instrument(skip(self))]
    pub async fn restart(&mut self) -> Result<&Song> {
        let index = self.cursor.ok_or(NavigationError::NoCurrentSong)?;
        self.play_at(index).await
    }

    /// Stop the active session, if any, and wait for its teardown.
    ///
    /// The cursor is kept so `restart` can replay the song.
    pub async fn stop(&mut self) -> Option<SessionOutcome> {
        let active = self.active.take()?;
        active.stop.cancel();
        Self::join(active).await
    }

    /// Wait for the active session to end on its own.
    ///
    /// Returns `None` when nothing is playing. Cancel-safe: dropping the
    /// returned future leaves the session running.
    pub async fn wait_until_finished(&mut self) -> Option<SessionOutcome> {
        let active = self.active.as_mut()?;
        let joined = (&mut active.task).await;
        let index = active.index;
        self.active = None;
        Self::outcome_of(index, joined)
    }

    async fn play_at(&mut self, index: usize) -> Result<&Song> {
        if let Some(outcome) = self.stop().await {
            debug!(?outcome, "Previous session ended");
        }

        self.cursor = Some(index);
        let song = &self.songs[index];
        info!(index, title = song.title(), "Playing song");
        self.publish(PlaylistEvent::Selected {
            index,
            title: song.title().to_string(),
        });

        let mut session = PlaybackSession::new(
            song.to_request(),
            Arc::clone(&self.backend),
            Arc::clone(&self.sink),
            self.config,
        );
        if let Some(bus) = &self.events {
            session = session.with_event_bus(bus.clone());
        }

        session.open().await.map_err(LibraryError::Playback)?;

        let stop = CancellationToken::new();
        let session_stop = stop.clone();
        let task = tokio::spawn(async move { session.wait(&session_stop).await });

        self.active = Some(ActiveSession { stop, task, index });
        Ok(&self.songs[index])
    }

    async fn join(active: ActiveSession) -> Option<SessionOutcome> {
        let joined = active.task.await;
        Self::outcome_of(active.index, joined)
    }

    fn outcome_of(
        index: usize,
        joined: std::result::Result<
            core_playback::Result<SessionOutcome>,
            tokio::task::JoinError,
        >,
    ) -> Option<SessionOutcome> {
        match joined {
            Ok(Ok(outcome)) => Some(outcome),
            Ok(Err(e)) => {
                warn!(index, error = %e, "Session ended with an error");
                None
            }
            Err(e) => {
                warn!(index, error = %e, "Session task failed");
                None
            }
        }
    }

    fn publish(&self, event: PlaylistEvent) {
        if let Some(bus) = &self.events {
            bus.publish(CoreEvent::Playlist(event));
        }
    }
}

impl Drop for Playlist {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            // The session task tears down once it observes the token.
            active.stop.cancel();
        }
    }
}

impl fmt::Debug for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playlist")
            .field("len", &self.songs.len())
            .field("cursor", &self.cursor)
            .field("playing", &self.active.as_ref().map(|active| active.index))
            .finish()
    }
}
