//! Event vocabulary and the serialized event log.
//!
//! Every observable action in a simulation run is funneled through one
//! [`EventLog`]. The log stamps each [`Event`] with the elapsed
//! milliseconds since the run started and hands it to an [`EventSink`]
//! under a single lock, so entries never interleave and timestamps are
//! non-decreasing in sink order.
//!
//! ```text
//!   operative / staff threads
//!            │  emit(Event)
//!            ▼
//!   ┌──────────────────────────┐
//!   │ EventLog (Mutex)         │  stamp → seq, at_ms
//!   │   └── dyn EventSink      │  WriterSink | MemorySink | Tee
//!   └──────────────────────────┘
//! ```

mod event;
mod log;
mod sink;

pub use event::{Event, Stamped};
pub use log::EventLog;
pub use sink::{EventSink, MemorySink, Tee, WriterSink};
