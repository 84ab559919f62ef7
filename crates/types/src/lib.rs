//! Core types for the operative simulation.
//!
//! Everything here is plain data: identifiers for the participants and
//! resources, and the [`Roster`] that derives each operative's unit,
//! station and role from its identity. Nothing in this crate blocks or
//! touches a clock.

mod identifiers;
mod operative;
mod roster;

pub use identifiers::{OperativeId, StaffId, StationId, UnitId};
pub use operative::{Operative, Role};
pub use roster::{Roster, RosterError, DEFAULT_STATIONS};
