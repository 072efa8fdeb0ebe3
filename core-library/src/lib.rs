//! # Library Module
//!
//! Owns the songs and the playlist that navigates them.
//!
//! ## Overview
//!
//! This module manages:
//! - The [`Song`] model and lyric file loading
//! - The [`Playlist`]: ordered songs, a cursor, and the single active
//!   playback session

pub mod error;
pub mod lyrics;
pub mod models;
pub mod playlist;

pub use error::{LibraryError, NavigationError, Result};
pub use lyrics::{load_lyrics, load_optional_lyrics, song_from_entry};
pub use models::Song;
pub use playlist::Playlist;
