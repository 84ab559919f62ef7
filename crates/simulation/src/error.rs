//! Error types for configuring and running a simulation.

use shadows_sync::SyncError;
use shadows_types::RosterError;
use thiserror::Error;

/// Invalid simulation input. Raised before any thread is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Operative/unit/station shape is unusable.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// No staff to read the ledger.
    #[error("staff count must be positive")]
    ZeroStaff,

    /// A hold duration of zero.
    #[error("{field} must be positive")]
    ZeroDuration {
        /// Which duration.
        field: &'static str,
    },
}

/// Failure of a simulation run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration rejected up front.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A task misused a synchronization primitive.
    #[error("synchronization contract violated: {0}")]
    Sync(#[from] SyncError),

    /// A task thread panicked.
    #[error("{task} panicked")]
    TaskPanicked {
        /// Name of the task.
        task: String,
    },

    /// The ledger did not reach one entry per unit.
    #[error("ledger recorded {completed} of {expected} units")]
    IncompleteLedger {
        /// Units recorded.
        completed: u32,
        /// Units in the run.
        expected: u32,
    },

    /// The event sink failed.
    #[error("event sink failed: {0}")]
    Sink(#[from] std::io::Error),
}
