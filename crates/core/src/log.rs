//! The serialized, timestamped event log.

use crate::{Event, EventSink, Stamped};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Shared handle to the run's single event log.
///
/// Cloning is cheap; all clones append to the same sink. The timestamp is
/// taken while the log lock is held, so `at_ms` never decreases along the
/// sink order even when emitters race.
#[derive(Clone)]
pub struct EventLog {
    inner: Arc<Inner>,
}

struct Inner {
    start: Instant,
    state: Mutex<State>,
}

struct State {
    sink: Box<dyn EventSink>,
    next_seq: u64,
    /// First sink failure. Later entries are still offered to the sink.
    error: Option<io::Error>,
}

impl EventLog {
    /// Start a log; the clock starts now.
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                start: Instant::now(),
                state: Mutex::new(State {
                    sink: Box::new(sink),
                    next_seq: 0,
                    error: None,
                }),
            }),
        }
    }

    /// Time since the log was created.
    pub fn elapsed(&self) -> Duration {
        self.inner.start.elapsed()
    }

    /// Milliseconds since the log was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Append one event atomically.
    pub fn emit(&self, event: Event) {
        let mut state = self.inner.state.lock();
        let entry = Stamped {
            seq: state.next_seq,
            at_ms: self.elapsed_ms(),
            event,
        };
        state.next_seq += 1;

        trace!(
            seq = entry.seq,
            at_ms = entry.at_ms,
            kind = entry.event.kind(),
            "{}",
            entry.event
        );

        if let Err(e) = state.sink.record(&entry) {
            if state.error.is_none() {
                warn!(error = %e, seq = entry.seq, "Event sink failed");
                state.error = Some(e);
            }
        }
    }

    /// Number of entries emitted so far.
    pub fn len(&self) -> u64 {
        self.inner.state.lock().next_seq
    }

    /// Whether nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush the sink and report the first failure seen during the run.
    pub fn finish(&self) -> io::Result<()> {
        let mut state = self.inner.state.lock();
        let flushed = state.sink.flush();
        match state.error.take() {
            Some(e) => Err(e),
            None => flushed,
        }
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("elapsed", &self.elapsed())
            .field("len", &self.len())
            .finish()
    }
}
