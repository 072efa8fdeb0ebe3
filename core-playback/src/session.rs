//! # Playback Session
//!
//! One session plays one song: it opens the audio handle, starts it, arms
//! the lyric scheduler with the handle's duration, and waits until the audio
//! completes or a stop is requested.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──open──> Opening ──start ok──> Playing ──finished──> Completed
//!  ^                 │                    └────stop token──> Stopped
//!  └─open/start error┘
//! ```
//!
//! Teardown runs on every exit path, including drop, and always cancels the
//! scheduler before stopping and closing the audio handle.

use crate::config::{PlaybackConfig, SessionOutcome, SessionState};
use crate::error::{PlaybackError, Result};
use crate::scheduler::LyricScheduler;
use crate::traits::{AudioBackend, AudioHandle, LyricSink, PlaybackRequest};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::fmt;
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// The lifetime of one song being played.
pub struct PlaybackSession {
    request: PlaybackRequest,
    backend: Arc<dyn AudioBackend>,
    scheduler: LyricScheduler,
    handle: Option<Box<dyn AudioHandle>>,
    state: SessionState,
    config: PlaybackConfig,
    events: Option<EventBus>,
}

impl PlaybackSession {
    pub fn new(
        request: PlaybackRequest,
        backend: Arc<dyn AudioBackend>,
        sink: Arc<dyn LyricSink>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            request,
            backend,
            scheduler: LyricScheduler::new(sink),
            handle: None,
            state: SessionState::Idle,
            config,
            events: None,
        }
    }

    /// Publish lifecycle events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> &PlaybackRequest {
        &self.request
    }

    /// Current audio position, while the handle is open.
    pub fn position_micros(&self) -> Option<u64> {
        self.handle.as_ref().map(|handle| handle.position_micros())
    }

    /// Returns `true` while the lyric scheduler has pending lines.
    pub fn lyrics_pending(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Open and start the audio, then start the lyric schedule.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the file cannot be opened, or the
    /// handle's error if playback cannot start. In both cases the session
    /// returns to `Idle` and holds no resources.
    #[instrument(skip(self), fields(title = %self.request.title))]
    pub async fn open(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(PlaybackError::InvalidState(format!(
                "cannot open a session that is {:?}",
                self.state
            )));
        }
        self.config.validate()?;

        self.state = SessionState::Opening;
        debug!(path = %self.request.audio_path.display(), "Opening audio");

        let mut handle = match self.backend.open(&self.request.audio_path).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e)),
        };

        if let Err(e) = handle.start() {
            handle.stop();
            handle.close();
            return Err(self.fail(e));
        }

        let duration_micros = handle.duration_micros();
        self.handle = Some(handle);
        self.scheduler
            .start(Arc::clone(&self.request.lyrics), duration_micros);
        self.state = SessionState::Playing;

        info!(
            duration_ms = duration_micros / 1000,
            lines = self.request.lyrics.len(),
            "Playback started"
        );
        self.publish(PlaybackEvent::Started {
            title: self.request.title.clone(),
            duration_ms: duration_micros / 1000,
        });

        Ok(())
    }

    /// Wait until the audio finishes or `stop` is cancelled, then tear down.
    #[instrument(skip_all, fields(title = %self.request.title))]
    pub async fn wait(&mut self, stop: &CancellationToken) -> Result<SessionOutcome> {
        if self.state != SessionState::Playing {
            return Err(PlaybackError::InvalidState(format!(
                "cannot wait on a session that is {:?}",
                self.state
            )));
        }

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break SessionOutcome::Stopped,
                _ = ticker.tick() => {
                    if self.handle_finished() {
                        break SessionOutcome::Completed;
                    }
                }
            }
        };

        self.finish(outcome);
        Ok(outcome)
    }

    /// `open` followed by `wait`.
    pub async fn play(mut self, stop: CancellationToken) -> Result<SessionOutcome> {
        self.open().await?;
        self.wait(&stop).await
    }

    fn handle_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.teardown();
        self.state = outcome.into();

        let title = self.request.title.clone();
        match outcome {
            SessionOutcome::Completed => {
                info!("Playback completed");
                self.publish(PlaybackEvent::Completed { title });
            }
            SessionOutcome::Stopped => {
                info!("Playback stopped");
                self.publish(PlaybackEvent::Stopped { title });
            }
        }
    }

    fn fail(&mut self, err: PlaybackError) -> PlaybackError {
        error!(error = %err, "Failed to start playback");
        self.state = SessionState::Idle;
        self.publish(PlaybackEvent::Error {
            title: Some(self.request.title.clone()),
            message: err.to_string(),
            recoverable: err.is_transient(),
        });
        err
    }

    /// Release the scheduler and the audio handle, in that order. Idempotent.
    fn teardown(&mut self) {
        self.scheduler.cancel();
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
            handle.close();
            debug!("Audio handle released");
        }
    }

    fn publish(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            bus.publish(CoreEvent::Playback(event));
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown();
        if self.state.is_active() {
            self.state = SessionState::Stopped;
        }
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("title", &self.request.title)
            .field("state", &self.state)
            .field("has_handle", &self.handle.is_some())
            .finish()
    }
}
