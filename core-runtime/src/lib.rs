//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the song player:
//! - Logging and tracing infrastructure
//! - Configuration loading (songs, playback and logging settings)
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the playback and library
//! crates depend on. It establishes the logging conventions and the event
//! broadcasting mechanism used throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
