//! Progress reporting for pipeline invocations
//!
//! The pipeline describes what it is doing as an ordered sequence of
//! `ProgressEvent`s. Sinks decide where the events go (memory, a channel, an
//! NDJSON stream); the `ProgressReporter` sitting in front of a sink
//! guarantees that exactly one terminal event is delivered and that nothing
//! follows it.

mod event;
mod sink;

pub use event::{ProgressEvent, WireEvent, WireKind};
pub use sink::{ChannelSink, NdjsonSink, NullSink, ProgressSink};

/// Sink guard enforcing the terminal-event contract
pub struct ProgressReporter<S: ProgressSink> {
    sink: S,
    emitted: usize,
    finished: bool,
}

impl<S: ProgressSink> ProgressReporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            emitted: 0,
            finished: false,
        }
    }

    /// Forwards an event to the sink
    ///
    /// # Returns
    ///
    /// * `true` - The event was delivered
    /// * `false` - A terminal event was already delivered; this one was dropped
    pub fn emit(&mut self, event: ProgressEvent) -> bool {
        if self.finished {
            tracing::warn!(
                "Dropping {} event emitted after the terminal event",
                event.name()
            );
            return false;
        }

        self.finished = event.is_terminal();
        self.emitted += 1;
        self.sink.report(event);
        true
    }

    /// Returns true once a terminal event has been delivered
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of events delivered so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Returns the wrapped sink
    pub fn into_inner(self) -> S {
        self.sink
    }
}
