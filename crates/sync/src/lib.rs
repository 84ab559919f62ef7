//! Synchronization engine.
//!
//! Three blocking primitives guard the shared resources of a run:
//!
//! - [`StationPool`]: fixed set of mutually exclusive stations.
//! - [`GroupBarrier`]: one single-use arrival barrier per unit.
//! - [`Ledger`]: the completed-unit counter behind a reader-writer lock
//!   that stops admitting new readers while a writer waits.
//!
//! Every wait is a condition-variable loop that re-checks its predicate
//! after waking, and every state transition is written to the
//! [`EventLog`](shadows_core::EventLog) while the primitive's own lock is
//! held. The log order is therefore the order in which the transitions
//! actually happened.
//!
//! [`StopSignal`] is the cooperative shutdown flag for the staff loops.

mod barrier;
mod error;
mod ledger;
mod station;
mod stop;

pub use barrier::GroupBarrier;
pub use error::SyncError;
pub use ledger::{Ledger, LedgerStatus, ReadAccess, WriteAccess};
pub use station::{StationPermit, StationPool};
pub use stop::StopSignal;
