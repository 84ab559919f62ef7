//! Destinations for stamped events.

use crate::Stamped;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Where the [`EventLog`](crate::EventLog) sends entries.
///
/// The log serializes all calls, so implementations never see two
/// `record` calls at once and need no locking of their own.
pub trait EventSink: Send {
    /// Record one entry.
    fn record(&mut self, entry: &Stamped) -> io::Result<()>;

    /// Flush buffered output. Called once when the run finishes.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn record(&mut self, entry: &Stamped) -> io::Result<()> {
        (**self).record(entry)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Writes one line per entry to any `Write` (stdout, a file, a buffer).
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for WriterSink<W> {
    fn record(&mut self, entry: &Stamped) -> io::Result<()> {
        writeln!(self.writer, "{entry}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Keeps entries in memory for later inspection.
///
/// Clones share the same buffer, so a test can keep one handle while the
/// log owns the other.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Stamped>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in log order.
    pub fn entries(&self) -> Vec<Stamped> {
        self.entries.lock().clone()
    }

    /// Number of entries recorded so far.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, entry: &Stamped) -> io::Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Sends every entry to two sinks, first `A` then `B`.
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: EventSink, B: EventSink> Tee<A, B> {
    /// Combine two sinks.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn record(&mut self, entry: &Stamped) -> io::Result<()> {
        // Always feed the second sink, even if the first one failed.
        let first = self.first.record(entry);
        self.second.record(entry)?;
        first
    }

    fn flush(&mut self) -> io::Result<()> {
        let first = self.first.flush();
        self.second.flush()?;
        first
    }
}
