//! Playlist navigation tests
//!
//! Songs are served by a mock backend whose handles run on tokio's paused
//! clock and record every call, alongside the lyric lines, in one log.

use async_trait::async_trait;
use core_library::{LibraryError, NavigationError, Playlist, Song};
use core_playback::{
    AudioBackend, AudioHandle, ClockHandle, LyricLine, LyricSink, PlaybackError, Result,
    SessionOutcome,
};
use core_runtime::events::{CoreEvent, EventBus, PlaylistEvent};
use mockall::mock;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

mock! {
    pub Backend {}
    #[async_trait]
    impl AudioBackend for Backend {
        async fn open(&self, path: &Path) -> Result<Box<dyn AudioHandle>>;
    }
}

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

struct RecordingHandle {
    name: String,
    inner: ClockHandle,
    log: CallLog,
}

impl AudioHandle for RecordingHandle {
    fn start(&mut self) -> Result<()> {
        self.log.push(format!("start:{}", self.name));
        self.inner.start()
    }

    fn stop(&mut self) {
        self.log.push(format!("stop:{}", self.name));
        self.inner.stop();
    }

    fn close(self: Box<Self>) {
        self.log.push(format!("close:{}", self.name));
        Box::new(self.inner).close();
    }

    fn position_micros(&self) -> u64 {
        self.inner.position_micros()
    }

    fn duration_micros(&self) -> u64 {
        self.inner.duration_micros()
    }
}

struct LogSink(CallLog);

impl LyricSink for LogSink {
    fn emit(&self, line: &LyricLine) {
        self.0.push(format!("lyric:{}", line.text));
    }
}

/// Durations are keyed by file stem: `a.wav` lasts 1000ms, `b.wav` 500ms,
/// `c.wav` 2000ms. Any other file is missing.
fn backend(log: &CallLog) -> Arc<MockBackend> {
    let log = log.clone();
    let mut backend = MockBackend::new();
    backend.expect_open().returning(move |path| {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_uppercase();
        let millis = match name.as_str() {
            "A" => 1000,
            "B" => 500,
            "C" => 2000,
            _ => return Err(PlaybackError::NotFound(path.to_path_buf())),
        };
        Ok(Box::new(RecordingHandle {
            name,
            inner: ClockHandle::new(Duration::from_millis(millis)),
            log: log.clone(),
        }))
    });
    Arc::new(backend)
}

fn song(title: &str, lines: &[&str], file: &str) -> Song {
    let lyrics: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
    Song::new(title, lyrics, format!("/music/{file}"))
}

fn playlist(log: &CallLog) -> Playlist {
    let mut playlist = Playlist::new(backend(log), Arc::new(LogSink(log.clone())));
    playlist.add(song("A", &["x", "y"], "a.wav"));
    playlist.add(song("B", &[], "b.wav"));
    playlist.add(song("C", &["c1", "c2"], "c.wav"));
    playlist
}

fn navigation(err: LibraryError) -> NavigationError {
    match err {
        LibraryError::Navigation(nav) => nav,
        other => panic!("expected a navigation error, got {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_play_by_title_runs_to_completion() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);
    let start = Instant::now();

    let song = playlist.play_by_title("A").await.unwrap();
    assert_eq!(song.title(), "A");
    assert!(playlist.is_playing());

    let outcome = playlist.wait_until_finished().await;

    assert_eq!(outcome, Some(SessionOutcome::Completed));
    assert_eq!(start.elapsed(), Duration::from_millis(1000));
    assert_eq!(
        log.entries(),
        vec!["start:A", "lyric:x", "lyric:y", "stop:A", "close:A"]
    );
    assert!(!playlist.is_playing());
    assert_eq!(playlist.cursor(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_next_walks_forward_then_stops_at_end() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);

    assert_eq!(playlist.next().await.unwrap().title(), "A");
    assert_eq!(playlist.next().await.unwrap().title(), "B");
    assert_eq!(playlist.next().await.unwrap().title(), "C");

    let err = playlist.next().await.unwrap_err();
    assert_eq!(navigation(err), NavigationError::EndOfPlaylist);
    assert_eq!(playlist.cursor(), Some(2));
    assert!(playlist.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_previous_stops_at_beginning() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);

    let err = playlist.previous().await.unwrap_err();
    assert_eq!(navigation(err), NavigationError::BeginningOfPlaylist);
    assert_eq!(playlist.cursor(), None);

    playlist.play_by_index(2).await.unwrap();
    assert_eq!(playlist.previous().await.unwrap().title(), "A");

    let err = playlist.previous().await.unwrap_err();
    assert_eq!(navigation(err), NavigationError::BeginningOfPlaylist);
    assert_eq!(playlist.cursor(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_empty_playlist_refuses_navigation() {
    let log = CallLog::default();
    let mut playlist = Playlist::new(backend(&log), Arc::new(LogSink(log.clone())));

    assert!(playlist.is_empty());
    assert_eq!(
        navigation(playlist.next().await.unwrap_err()),
        NavigationError::EmptyPlaylist
    );
    assert_eq!(
        navigation(playlist.previous().await.unwrap_err()),
        NavigationError::EmptyPlaylist
    );
    assert_eq!(
        navigation(playlist.play_by_index(1).await.unwrap_err()),
        NavigationError::InvalidIndex {
            requested: 1,
            len: 0
        }
    );
    assert!(playlist.wait_until_finished().await.is_none());
    assert!(log.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_refused_requests_leave_active_session_alone() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);

    playlist.play_by_title("A").await.unwrap();
    sleep(Duration::from_millis(100)).await;

    let err = playlist.play_by_title("Wonderwall").await.unwrap_err();
    assert_eq!(err.to_string(), "Song \"Wonderwall\" not found in playlist.");

    for number in [0, 4] {
        let err = playlist.play_by_index(number).await.unwrap_err();
        assert_eq!(
            navigation(err),
            NavigationError::InvalidIndex {
                requested: number,
                len: 3
            }
        );
    }

    assert!(playlist.is_playing());
    assert_eq!(playlist.current().map(Song::title), Some("A"));

    assert_eq!(
        playlist.wait_until_finished().await,
        Some(SessionOutcome::Completed)
    );
    assert_eq!(
        log.entries(),
        vec!["start:A", "lyric:x", "lyric:y", "stop:A", "close:A"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_switching_tears_down_previous_song_first() {
    let log = CallLog::default();
    let mut playlist = Playlist::new(backend(&log), Arc::new(LogSink(log.clone())));
    playlist.add(song("A", &["a1", "a2", "a3", "a4"], "a.wav"));
    playlist.add(song("B", &[], "b.wav"));

    playlist.play_by_index(1).await.unwrap();
    sleep(Duration::from_millis(300)).await;

    playlist.play_by_index(2).await.unwrap();
    sleep(Duration::from_secs(3)).await;

    assert_eq!(
        log.entries(),
        vec![
            "start:A", "lyric:a1", "lyric:a2", "stop:A", "close:A", "start:B", "stop:B",
            "close:B",
        ]
    );
    assert_eq!(
        playlist.wait_until_finished().await,
        Some(SessionOutcome::Completed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_open_failure_moves_cursor_without_session() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);
    playlist.add(song("Ghost", &["boo"], "ghost.wav"));

    playlist.play_by_title("A").await.unwrap();
    sleep(Duration::from_millis(100)).await;
    let err = playlist.play_by_title("Ghost").await.unwrap_err();

    assert!(matches!(
        err,
        LibraryError::Playback(PlaybackError::NotFound(_))
    ));
    assert_eq!(playlist.cursor(), Some(3));
    assert!(!playlist.is_playing());
    assert!(playlist.wait_until_finished().await.is_none());

    sleep(Duration::from_secs(2)).await;
    assert_eq!(log.entries(), vec!["start:A", "lyric:x", "stop:A", "close:A"]);

    assert_eq!(playlist.previous().await.unwrap().title(), "C");
}

#[tokio::test(start_paused = true)]
async fn test_restart_replays_current_song() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);

    let err = playlist.restart().await.unwrap_err();
    assert_eq!(navigation(err), NavigationError::NoCurrentSong);

    playlist.play_by_title("A").await.unwrap();
    sleep(Duration::from_millis(600)).await;
    playlist.restart().await.unwrap();
    playlist.wait_until_finished().await;

    assert_eq!(
        log.entries(),
        vec![
            "start:A", "lyric:x", "lyric:y", "stop:A", "close:A", "start:A", "lyric:x",
            "lyric:y", "stop:A", "close:A",
        ]
    );
    assert_eq!(playlist.cursor(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_stop_keeps_cursor() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);

    assert_eq!(playlist.stop().await, None);

    playlist.play_by_title("C").await.unwrap();
    sleep(Duration::from_millis(200)).await;

    assert_eq!(playlist.stop().await, Some(SessionOutcome::Stopped));
    assert!(!playlist.is_playing());
    assert_eq!(playlist.cursor(), Some(2));

    sleep(Duration::from_secs(5)).await;
    assert_eq!(log.entries(), vec!["start:C", "lyric:c1", "stop:C", "close:C"]);
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_finished_is_cancel_safe() {
    let log = CallLog::default();
    let mut playlist = playlist(&log);
    playlist.play_by_title("A").await.unwrap();

    let early = timeout(Duration::from_millis(200), playlist.wait_until_finished()).await;
    assert!(early.is_err());
    assert!(playlist.is_playing());

    assert_eq!(
        playlist.wait_until_finished().await,
        Some(SessionOutcome::Completed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_listing_is_numbered_from_one() {
    let log = CallLog::default();
    let playlist = playlist(&log);

    assert_eq!(playlist.len(), 3);
    assert_eq!(playlist.list().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    assert_eq!(
        playlist.list_numbered().collect::<Vec<_>>(),
        vec![(1, "A"), (2, "B"), (3, "C")]
    );
    assert!(!playlist.is_playing());
    assert_eq!(playlist.current(), None);
}

#[tokio::test(start_paused = true)]
async fn test_playlist_events_published() {
    let log = CallLog::default();
    let bus = EventBus::new(32);
    let mut stream = bus
        .stream()
        .filter(|event| matches!(event, CoreEvent::Playlist(_)));

    let mut playlist =
        Playlist::new(backend(&log), Arc::new(LogSink(log.clone()))).with_event_bus(bus.clone());
    playlist.add(song("A", &["x"], "a.wav"));
    playlist.add(song("B", &[], "b.wav"));

    playlist.play_by_index(2).await.unwrap();
    let _ = playlist.next().await;

    let expected = vec![
        PlaylistEvent::SongAdded {
            index: 0,
            title: "A".to_string(),
        },
        PlaylistEvent::SongAdded {
            index: 1,
            title: "B".to_string(),
        },
        PlaylistEvent::Selected {
            index: 1,
            title: "B".to_string(),
        },
        PlaylistEvent::EndReached,
    ];
    for event in expected {
        assert_eq!(stream.recv().await.unwrap(), CoreEvent::Playlist(event));
    }
}
