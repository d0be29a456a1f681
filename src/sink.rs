//! Output sinks for live process output.
//!
//! A [`Sink`] is the append-only, two-channel text destination that every
//! step of a pipeline writes to. Process output is forwarded line by line as
//! it is produced, and failure reasons are written to the error channel
//! before a step reports failure.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Append-only text destination with a standard and an error channel.
///
/// Only one step of a pipeline is active at a time, so implementations only
/// need to tolerate one writer at a time. They must still be `Send + Sync`
/// because the sink is shared between steps through an [`Arc`].
///
/// # Example
///
/// ```rust
/// use install_pipeline::{MemorySink, Sink};
///
/// let sink = MemorySink::new();
/// sink.stdout("Resolving deltas: 100%");
/// sink.stderr("warning: redirecting");
/// assert_eq!(sink.stdout_text(), "Resolving deltas: 100%\n");
/// ```
pub trait Sink: Send + Sync {
    /// Append a line to the standard channel.
    fn stdout(&self, text: &str);

    /// Append a line to the error channel.
    fn stderr(&self, text: &str);
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn stdout(&self, text: &str) {
        (**self).stdout(text)
    }

    fn stderr(&self, text: &str) {
        (**self).stderr(text)
    }
}

/// Sink that writes to the current process's stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn stdout(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", text);
    }

    fn stderr(&self, text: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", text);
    }
}

/// Sink that forwards every line as a `tracing` event.
///
/// Standard output becomes `INFO` events and error output `WARN` events,
/// both under the `install_pipeline::output` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn stdout(&self, text: &str) {
        tracing::info!(target: "install_pipeline::output", "{}", text);
    }

    fn stderr(&self, text: &str) {
        tracing::warn!(target: "install_pipeline::output", "{}", text);
    }
}

/// Which channel a recorded line was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Standard output.
    Stdout,
    /// Error output.
    Stderr,
}

/// A single line recorded by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkLine {
    /// Channel the line was written to.
    pub channel: Channel,
    /// The text, without a trailing newline.
    pub text: String,
}

/// Sink that records every line in write order.
///
/// Useful for hosts that render output after the fact, and for asserting on
/// step ordering in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<SinkLine>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, channel: Channel, text: &str) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.push(SinkLine {
            channel,
            text: text.to_string(),
        });
    }

    /// Snapshot of every recorded line, in write order.
    pub fn lines(&self) -> Vec<SinkLine> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn channel_text(&self, channel: Channel) -> String {
        self.lines()
            .into_iter()
            .filter(|line| line.channel == channel)
            .map(|line| line.text + "\n")
            .collect()
    }

    /// Everything written to the standard channel, newline-terminated.
    pub fn stdout_text(&self) -> String {
        self.channel_text(Channel::Stdout)
    }

    /// Everything written to the error channel, newline-terminated.
    pub fn stderr_text(&self) -> String {
        self.channel_text(Channel::Stderr)
    }

    /// Whether any line on either channel contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.text.contains(needle))
    }
}

impl Sink for MemorySink {
    fn stdout(&self, text: &str) {
        self.push(Channel::Stdout, text);
    }

    fn stderr(&self, text: &str) {
        self.push(Channel::Stderr, text);
    }
}
