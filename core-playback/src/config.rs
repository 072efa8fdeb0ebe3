//! # Playback Configuration
//!
//! Configuration types for playback sessions.

use crate::error::{PlaybackError, Result};
use core_runtime::config::PlaybackSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How often a playing session checks the handle for completion.
    ///
    /// Default: 100 ms.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

impl PlaybackConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "poll_interval must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl From<&PlaybackSettings> for PlaybackConfig {
    fn from(settings: &PlaybackSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
        }
    }
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(100)
}

// ============================================================================
// Session State
// ============================================================================

/// Lifecycle state of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing opened yet.
    Idle,
    /// Opening the audio resource.
    Opening,
    /// Audio is playing and lyrics are scheduled.
    Playing,
    /// Audio reached its end.
    Completed,
    /// Stopped by request.
    Stopped,
}

impl SessionState {
    /// Returns `true` if the session holds live resources.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Opening | Self::Playing)
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Stopped,
}

impl From<SessionOutcome> for SessionState {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Completed => SessionState::Completed,
            SessionOutcome::Stopped => SessionState::Stopped,
        }
    }
}
