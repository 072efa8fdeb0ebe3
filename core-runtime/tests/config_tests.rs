//! Integration tests for loading the player configuration from disk

use core_runtime::config::{PlayerConfig, DEFAULT_POLL_INTERVAL_MS};
use core_runtime::Error;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_resolves_paths_relative_to_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songplayer.toml");
    fs::write(
        &path,
        r#"
        [[songs]]
        title = "Beautiful Things"
        lyrics = "lyrics/beautiful_things.txt"
        audio = "music/beautiful_things.wav"

        [[songs]]
        title = "Dandelions"
        audio = "music/dandelions.wav"
        "#,
    )
    .unwrap();

    let config = PlayerConfig::load(&path).await.unwrap();

    assert_eq!(config.songs.len(), 2);
    assert_eq!(
        config.songs[0].audio,
        dir.path().join("music/beautiful_things.wav")
    );
    assert_eq!(
        config.songs[0].lyrics,
        Some(dir.path().join("lyrics/beautiful_things.txt"))
    );
    assert_eq!(config.songs[1].lyrics, None);
    assert_eq!(config.playback.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
}

#[tokio::test]
async fn test_missing_song_files_are_not_config_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songplayer.toml");
    fs::write(
        &path,
        "[[songs]]\ntitle = \"Ghost\"\nlyrics = \"nope.txt\"\naudio = \"nope.wav\"\n",
    )
    .unwrap();

    let config = PlayerConfig::load(&path).await.unwrap();
    assert_eq!(config.songs[0].title, "Ghost");
}

#[tokio::test]
async fn test_missing_config_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = PlayerConfig::load(&path).await.unwrap_err();
    match err {
        Error::ConfigRead { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected ConfigRead, got {:?}", other),
    }
}

#[tokio::test]
async fn test_song_without_audio_still_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songplayer.toml");
    fs::write(
        &path,
        "[[songs]]\ntitle = \"No Audio\"\n\n[[songs]]\ntitle = \"B\"\naudio = \"b.wav\"\n",
    )
    .unwrap();

    let config = PlayerConfig::load(&path).await.unwrap();
    assert_eq!(config.songs.len(), 2);
    assert!(config.songs[0].audio.as_os_str().is_empty());
    assert_eq!(config.songs[1].audio, dir.path().join("b.wav"));
}

#[tokio::test]
async fn test_song_without_title_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songplayer.toml");
    fs::write(&path, "[[songs]]\naudio = \"a.wav\"\n").unwrap();

    let err = PlayerConfig::load(&path).await.unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
}

#[tokio::test]
async fn test_invalid_settings_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songplayer.toml");
    fs::write(&path, "[playback]\nevent_buffer_size = 0\n").unwrap();

    let err = PlayerConfig::load(&path).await.unwrap_err();
    assert!(err.to_string().contains("Event buffer size"));
}

#[tokio::test]
async fn test_demo_playlist_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../demo/songplayer.toml");

    let config = PlayerConfig::load(&path).await.unwrap();

    let titles: Vec<_> = config.songs.iter().map(|song| song.title.as_str()).collect();
    assert_eq!(titles, vec!["Morning Tide", "Paper Lanterns", "Interlude"]);
    assert!(config.songs[2].lyrics.is_none());
    for song in &config.songs {
        assert!(song.audio.is_file(), "{} is missing", song.audio.display());
    }
}
