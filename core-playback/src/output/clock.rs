//! Silent output driven by the tokio clock.
//!
//! The file is validated and measured with [`SymphoniaProbe`]; the handle then
//! reports elapsed time since `start` as its position. Under paused tokio time
//! this makes playback fully deterministic.

use crate::decoder::SymphoniaProbe;
use crate::error::{PlaybackError, Result};
use crate::traits::{duration_to_micros, AudioBackend, AudioHandle};
use async_trait::async_trait;
use core_runtime::logging::strip_path;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Backend producing [`ClockHandle`]s.
#[derive(Debug, Default, Clone)]
pub struct ClockBackend;

impl ClockBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioBackend for ClockBackend {
    #[instrument(skip_all, fields(file = %strip_path(&path.to_string_lossy())))]
    async fn open(&self, path: &Path) -> Result<Box<dyn AudioHandle>> {
        let owned = path.to_path_buf();
        let probe = tokio::task::spawn_blocking(move || SymphoniaProbe::probe_file(&owned))
            .await
            .map_err(|e| PlaybackError::Internal(format!("Probe task failed: {}", e)))??;

        debug!(duration = ?probe.duration, "Opened silent clock handle");
        Ok(Box::new(ClockHandle::new(probe.duration)))
    }
}

/// Audio handle whose position is wall-clock time since `start`.
#[derive(Debug)]
pub struct ClockHandle {
    duration: Duration,
    started_at: Option<Instant>,
    stopped_at: Option<Duration>,
}

impl ClockHandle {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: None,
            stopped_at: None,
        }
    }

    fn position(&self) -> Duration {
        if let Some(frozen) = self.stopped_at {
            return frozen;
        }
        match self.started_at {
            Some(started_at) => started_at.elapsed().min(self.duration),
            None => Duration::ZERO,
        }
    }
}

impl AudioHandle for ClockHandle {
    fn start(&mut self) -> Result<()> {
        self.started_at = Some(Instant::now());
        self.stopped_at = None;
        Ok(())
    }

    fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(self.position());
        }
    }

    fn close(self: Box<Self>) {
        debug!(position = ?self.position(), "Closing clock handle");
    }

    fn position_micros(&self) -> u64 {
        duration_to_micros(self.position())
    }

    fn duration_micros(&self) -> u64 {
        duration_to_micros(self.duration)
    }
}
