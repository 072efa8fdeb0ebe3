//! Audible output through `rodio`.
//!
//! `rodio::OutputStream` is not `Send`, so each handle owns a dedicated thread
//! that creates the stream, hands the `Sink` back, and keeps the stream alive
//! until the handle is closed.

use crate::decoder::SymphoniaProbe;
use crate::error::{PlaybackError, Result};
use crate::traits::{duration_to_micros, AudioBackend, AudioHandle};
use async_trait::async_trait;
use core_runtime::logging::strip_path;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Backend producing [`RodioHandle`]s on the default output device.
#[derive(Debug, Default, Clone)]
pub struct RodioBackend;

impl RodioBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioBackend for RodioBackend {
    #[instrument(skip_all, fields(file = %strip_path(&path.to_string_lossy())))]
    async fn open(&self, path: &Path) -> Result<Box<dyn AudioHandle>> {
        let owned: PathBuf = path.to_path_buf();
        let handle = tokio::task::spawn_blocking(move || RodioHandle::open(&owned))
            .await
            .map_err(|e| PlaybackError::Internal(format!("Open task failed: {}", e)))??;

        Ok(Box::new(handle))
    }
}

/// Audio handle playing through a `rodio::Sink`.
pub struct RodioHandle {
    sink: Sink,
    duration: Duration,
    started: bool,
    stopped_at: Option<Duration>,
    shutdown: Option<mpsc::Sender<()>>,
    stream_thread: Option<JoinHandle<()>>,
}

impl RodioHandle {
    fn open(path: &Path) -> Result<Self> {
        // Validates the container before the device is touched.
        let probe = SymphoniaProbe::probe_file(path)?;

        let file = File::open(path).map_err(|e| PlaybackError::from_open_error(path, e))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| PlaybackError::InvalidFormat(e.to_string()))?;
        let duration = source.total_duration().unwrap_or(probe.duration);

        let (ready_tx, ready_rx) = mpsc::channel::<Result<Sink>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let stream_thread = std::thread::Builder::new()
            .name("songplayer-output".to_string())
            .spawn(move || {
                let (stream, stream_handle) = match OutputStream::try_default() {
                    Ok(pair) => pair,
                    Err(e) => {
                        let _ = ready_tx.send(Err(PlaybackError::AudioDeviceUnavailable(
                            e.to_string(),
                        )));
                        return;
                    }
                };

                match Sink::try_new(&stream_handle) {
                    Ok(sink) => {
                        if ready_tx.send(Ok(sink)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(PlaybackError::AudioDeviceUnavailable(
                            e.to_string(),
                        )));
                        return;
                    }
                }

                // Returns once the sender is dropped by `close` or drop.
                let _ = shutdown_rx.recv();
                drop(stream);
            })
            .map_err(|e| PlaybackError::Internal(format!("Failed to spawn output thread: {}", e)))?;

        let sink = ready_rx.recv().map_err(|_| {
            PlaybackError::AudioDeviceUnavailable("output thread exited".to_string())
        })??;

        sink.pause();
        sink.append(source);

        debug!(?duration, "Opened rodio handle");

        Ok(Self {
            sink,
            duration,
            started: false,
            stopped_at: None,
            shutdown: Some(shutdown_tx),
            stream_thread: Some(stream_thread),
        })
    }

    fn position(&self) -> Duration {
        if let Some(frozen) = self.stopped_at {
            return frozen;
        }
        if !self.started {
            return Duration::ZERO;
        }
        if self.sink.empty() {
            return self.duration;
        }
        self.sink.get_pos().min(self.duration)
    }
}

impl AudioHandle for RodioHandle {
    fn start(&mut self) -> Result<()> {
        if self.stopped_at.is_some() {
            return Err(PlaybackError::PlaybackFailed(
                "handle was already stopped".to_string(),
            ));
        }
        self.started = true;
        self.sink.play();
        Ok(())
    }

    fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(self.position());
            self.sink.stop();
        }
    }

    fn close(mut self: Box<Self>) {
        self.sink.stop();
        self.shutdown.take();
        if let Some(thread) = self.stream_thread.take() {
            if thread.join().is_err() {
                warn!("Output thread panicked");
            }
        }
    }

    fn position_micros(&self) -> u64 {
        duration_to_micros(self.position())
    }

    fn duration_micros(&self) -> u64 {
        duration_to_micros(self.duration)
    }

    fn is_finished(&self) -> bool {
        self.started && self.stopped_at.is_none() && self.sink.empty()
    }
}
