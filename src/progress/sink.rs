//! Progress sink implementations

use super::event::ProgressEvent;
use std::io::Write;
use tokio::sync::mpsc::UnboundedSender;

/// One-way receiver of progress events
///
/// The pipeline never reads anything back from a sink; a sink that cannot
/// deliver an event drops it.
pub trait ProgressSink: Send {
    /// Receives the next event in emission order
    fn report(&mut self, event: ProgressEvent);
}

impl ProgressSink for Vec<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn report(&mut self, event: ProgressEvent) {
        (**self).report(event);
    }
}

impl<A: ProgressSink, B: ProgressSink> ProgressSink for (A, B) {
    fn report(&mut self, event: ProgressEvent) {
        self.0.report(event.clone());
        self.1.report(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _event: ProgressEvent) {}
}

/// Forwards events to a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn report(&mut self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Progress receiver dropped, discarding event");
        }
    }
}

/// Writes each event as one line of JSON in the `{type, message, data}` shape
///
/// Every line is flushed as soon as it is written so a client reading the
/// other end sees events live.
pub struct NdjsonSink<W: Write + Send> {
    writer: W,
    failed: bool,
}

impl<W: Write + Send> NdjsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &ProgressEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, &event.to_wire())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write + Send> ProgressSink for NdjsonSink<W> {
    fn report(&mut self, event: ProgressEvent) {
        if self.failed {
            return;
        }

        if let Err(e) = self.write_event(&event) {
            tracing::warn!("Failed to write progress event, disabling stream: {}", e);
            self.failed = true;
        }
    }
}
