//! Lyric sink implementations.

use crate::traits::{LyricLine, LyricSink};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::warn;

/// Prints each line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLyricSink;

impl LyricSink for ConsoleLyricSink {
    fn emit(&self, line: &LyricLine) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line.text).and_then(|_| stdout.flush()) {
            warn!("Failed to write lyric line: {}", e);
        }
    }
}

/// Forwards lines into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelLyricSink {
    sender: mpsc::UnboundedSender<LyricLine>,
}

impl ChannelLyricSink {
    pub fn new(sender: mpsc::UnboundedSender<LyricLine>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LyricLine>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl LyricSink for ChannelLyricSink {
    fn emit(&self, line: &LyricLine) {
        // A closed receiver means nobody is listening anymore.
        let _ = self.sender.send(line.clone());
    }
}
