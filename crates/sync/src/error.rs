//! Contract violations raised by the primitives.

use shadows_types::{StationId, UnitId};
use thiserror::Error;

/// Misuse of a synchronization primitive.
///
/// These are programming errors in the caller, not conditions a correct
/// run can hit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Station index outside the pool.
    #[error("{station} does not exist (pool has {stations} stations)")]
    UnknownStation {
        /// Requested station.
        station: StationId,
        /// Pool size.
        stations: u32,
    },

    /// Unit index outside the barrier table.
    #[error("{unit} does not exist ({units} units)")]
    UnknownUnit {
        /// Requested unit.
        unit: UnitId,
        /// Number of units.
        units: u32,
    },

    /// More arrivals than the unit has members.
    #[error("{unit} already has all {group_size} arrivals")]
    BarrierOverrun {
        /// Unit that overflowed.
        unit: UnitId,
        /// Members per unit.
        group_size: u32,
    },

    /// A unit asked to be recorded in the ledger a second time.
    #[error("{unit} has already been recorded in the ledger")]
    UnitAlreadyRecorded {
        /// Offending unit.
        unit: UnitId,
    },
}
