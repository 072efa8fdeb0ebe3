//! # Lyric Scheduler
//!
//! Emits lyric lines at evenly spaced offsets from the start of playback.
//!
//! ## Timing
//!
//! For `N` lines and a total duration of `D` microseconds, line `i` fires at
//! `i * (D / N)` with truncating integer division. Line 0 therefore fires as
//! soon as the schedule starts and the last line fires one interval before
//! the end of the song.
//!
//! ## Execution
//!
//! A single tokio task drains a min-heap ordered by `(offset, index)` and
//! sleeps until each entry falls due, so lines are emitted in order even when
//! offsets collide (zero duration). Cancellation goes through a gate lock that
//! the task holds while emitting: once [`LyricScheduler::cancel`] returns, no
//! further line can be emitted.

use crate::traits::{LyricLine, LyricSink};
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// One lyric line's fire time.
///
/// Ordering is by offset, then by line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LyricScheduleEntry {
    pub fire_offset_micros: u64,
    pub line_index: usize,
}

/// Compute the fire offsets for `line_count` lines spread over
/// `total_duration_micros`.
///
/// Returns an empty schedule when there are no lines.
pub fn compute_schedule(line_count: usize, total_duration_micros: u64) -> Vec<LyricScheduleEntry> {
    if line_count == 0 {
        return Vec::new();
    }

    let interval = total_duration_micros / line_count as u64;
    (0..line_count)
        .map(|line_index| LyricScheduleEntry {
            fire_offset_micros: line_index as u64 * interval,
            line_index,
        })
        .collect()
}

struct ScheduleRun {
    token: CancellationToken,
    /// `true` once cancelled; held by the task for the duration of an emit.
    gate: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl ScheduleRun {
    fn cancel(&self) {
        self.token.cancel();
        *self.gate.lock() = true;
    }
}

/// Schedules lyric lines against the playback clock.
///
/// Requires a tokio runtime when started.
pub struct LyricScheduler {
    sink: Arc<dyn LyricSink>,
    run: Option<ScheduleRun>,
}

impl LyricScheduler {
    pub fn new(sink: Arc<dyn LyricSink>) -> Self {
        Self { sink, run: None }
    }

    /// Start emitting `lines` over `total_duration_micros`.
    ///
    /// Any previous run is cancelled first. Empty lyrics leave the scheduler
    /// idle.
    pub fn start(&mut self, lines: Arc<[String]>, total_duration_micros: u64) {
        self.cancel();

        let schedule = compute_schedule(lines.len(), total_duration_micros);
        if schedule.is_empty() {
            debug!("No lyrics to schedule");
            return;
        }

        debug!(
            lines = schedule.len(),
            total_duration_micros, "Starting lyric schedule"
        );

        let token = CancellationToken::new();
        let gate = Arc::new(Mutex::new(false));
        let task = tokio::spawn(drain_schedule(
            schedule,
            lines,
            Instant::now(),
            Arc::clone(&self.sink),
            token.clone(),
            Arc::clone(&gate),
        ));

        self.run = Some(ScheduleRun { token, gate, task });
    }

    /// Stop all future emissions. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel();
            trace!("Lyric schedule cancelled");
        }
    }

    /// Returns `true` while lines are still pending.
    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .map(|run| !run.token.is_cancelled() && !run.task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for LyricScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for LyricScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LyricScheduler")
            .field("running", &self.is_running())
            .finish()
    }
}

async fn drain_schedule(
    schedule: Vec<LyricScheduleEntry>,
    lines: Arc<[String]>,
    anchor: Instant,
    sink: Arc<dyn LyricSink>,
    token: CancellationToken,
    gate: Arc<Mutex<bool>>,
) {
    let mut queue: BinaryHeap<Reverse<LyricScheduleEntry>> =
        schedule.into_iter().map(Reverse).collect();

    while let Some(Reverse(entry)) = queue.pop() {
        let deadline = anchor + Duration::from_micros(entry.fire_offset_micros);

        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = sleep_until(deadline) => {}
        }

        if !emit_unless_cancelled(&gate, sink.as_ref(), &lines, entry) {
            return;
        }
    }
}

/// Emit `entry` while holding the gate. Returns `false` if cancelled.
fn emit_unless_cancelled(
    gate: &Mutex<bool>,
    sink: &dyn LyricSink,
    lines: &[String],
    entry: LyricScheduleEntry,
) -> bool {
    let cancelled = gate.lock();
    if *cancelled {
        return false;
    }

    if let Some(text) = lines.get(entry.line_index) {
        trace!(index = entry.line_index, "Emitting lyric line");
        sink.emit(&LyricLine {
            index: entry.line_index,
            offset_micros: entry.fire_offset_micros,
            text: text.clone(),
        });
    }
    true
}
