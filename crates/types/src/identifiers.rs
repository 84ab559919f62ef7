//! Domain-specific identifier types.

use std::fmt;

/// Operative identifier.
///
/// Operatives are numbered from 1, matching how they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperativeId(pub u32);

impl OperativeId {
    /// Get the raw value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for OperativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operative {}", self.0)
    }
}

/// Typewriting station index (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(pub u32);

impl StationId {
    /// Index into the station pool.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// 1-based number used when reporting.
    pub fn number(&self) -> u32 {
        self.0 + 1
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station {}", self.number())
    }
}

/// Unit (group) index (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Index into the per-unit barrier table.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// 1-based number used when reporting.
    pub fn number(&self) -> u32 {
        self.0 + 1
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit {}", self.number())
    }
}

/// Intelligence staff identifier (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaffId(pub u32);

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Intelligence Staff {}", self.0)
    }
}
