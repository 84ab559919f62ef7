//! The operative data model.

use crate::{OperativeId, StationId, UnitId};

/// What an operative does once its station work is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Signals the unit barrier and is done.
    Member,
    /// Waits on the unit barrier, then records the unit in the ledger.
    Leader,
}

/// A single operative. Immutable once built by the [`Roster`](crate::Roster).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operative {
    /// Identity (1..=N).
    pub id: OperativeId,
    /// Unit this operative belongs to.
    pub unit: UnitId,
    /// Station this operative always uses.
    pub station: StationId,
    /// Member or leader.
    pub role: Role,
}

impl Operative {
    /// Whether this operative leads its unit.
    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }
}
