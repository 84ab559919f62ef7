//! Static assignment of operatives to units, stations and roles.
//!
//! All assignments are pure functions of identity:
//!
//! - unit    = (id - 1) / group_size
//! - station = id mod stations
//! - leader  = the numerically largest id of its unit, i.e. id == (unit + 1) * group_size

use crate::{Operative, OperativeId, Role, StationId, UnitId};
use thiserror::Error;

/// Number of typewriting stations when none is configured.
pub const DEFAULT_STATIONS: u32 = 4;

/// Invalid roster shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// No operatives at all.
    #[error("operative count must be positive")]
    ZeroOperatives,

    /// Group size of zero.
    #[error("group size must be positive")]
    ZeroGroupSize,

    /// Operatives cannot be split into whole units.
    #[error("{operatives} operatives cannot be divided into units of {group_size}")]
    IndivisibleGroups {
        /// Operative count.
        operatives: u32,
        /// Requested group size.
        group_size: u32,
    },

    /// No stations to work at.
    #[error("station count must be positive")]
    ZeroStations,
}

/// The validated shape of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roster {
    operatives: u32,
    group_size: u32,
    stations: u32,
}

impl Roster {
    /// Build a roster, rejecting shapes that could never complete.
    pub fn new(operatives: u32, group_size: u32, stations: u32) -> Result<Self, RosterError> {
        if operatives == 0 {
            return Err(RosterError::ZeroOperatives);
        }
        if group_size == 0 {
            return Err(RosterError::ZeroGroupSize);
        }
        if operatives % group_size != 0 {
            return Err(RosterError::IndivisibleGroups {
                operatives,
                group_size,
            });
        }
        if stations == 0 {
            return Err(RosterError::ZeroStations);
        }
        Ok(Self {
            operatives,
            group_size,
            stations,
        })
    }

    /// Total operatives (N).
    pub fn operatives(&self) -> u32 {
        self.operatives
    }

    /// Operatives per unit (M).
    pub fn group_size(&self) -> u32 {
        self.group_size
    }

    /// Number of units (N / M).
    pub fn units(&self) -> u32 {
        self.operatives / self.group_size
    }

    /// Number of stations.
    pub fn stations(&self) -> u32 {
        self.stations
    }

    /// Unit of a given operative.
    pub fn unit_of(&self, id: OperativeId) -> UnitId {
        UnitId((id.0 - 1) / self.group_size)
    }

    /// Station of a given operative.
    pub fn station_of(&self, id: OperativeId) -> StationId {
        StationId(id.0 % self.stations)
    }

    /// Leader of a unit.
    pub fn leader_of(&self, unit: UnitId) -> OperativeId {
        OperativeId((unit.0 + 1) * self.group_size)
    }

    /// Describe one operative. Returns `None` for ids outside 1..=N.
    pub fn operative(&self, id: OperativeId) -> Option<Operative> {
        if id.0 == 0 || id.0 > self.operatives {
            return None;
        }
        let unit = self.unit_of(id);
        let role = if self.leader_of(unit) == id {
            Role::Leader
        } else {
            Role::Member
        };
        Some(Operative {
            id,
            unit,
            station: self.station_of(id),
            role,
        })
    }

    /// All operatives in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = Operative> + '_ {
        (1..=self.operatives)
            .filter_map(move |id| self.operative(OperativeId(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(Roster::new(0, 5, 4), Err(RosterError::ZeroOperatives));
        assert_eq!(Roster::new(15, 0, 4), Err(RosterError::ZeroGroupSize));
        assert_eq!(
            Roster::new(14, 5, 4),
            Err(RosterError::IndivisibleGroups {
                operatives: 14,
                group_size: 5,
            })
        );
        assert_eq!(Roster::new(15, 5, 0), Err(RosterError::ZeroStations));
    }

    #[test]
    fn test_assignments() {
        let roster = Roster::new(15, 5, DEFAULT_STATIONS).unwrap();
        assert_eq!(roster.units(), 3);

        let first = roster.operative(OperativeId(1)).unwrap();
        assert_eq!(first.unit, UnitId(0));
        assert_eq!(first.station, StationId(1));
        assert_eq!(first.role, Role::Member);

        let fifth = roster.operative(OperativeId(5)).unwrap();
        assert_eq!(fifth.unit, UnitId(0));
        assert!(fifth.is_leader());

        let sixth = roster.operative(OperativeId(6)).unwrap();
        assert_eq!(sixth.unit, UnitId(1));
        assert!(!sixth.is_leader());

        // id mod 4 wraps onto station 0
        assert_eq!(roster.station_of(OperativeId(8)), StationId(0));
    }

    #[test]
    fn test_exactly_one_leader_per_unit() {
        let roster = Roster::new(12, 3, 4).unwrap();
        for unit in 0..roster.units() {
            let leaders: Vec<_> = roster
                .iter()
                .filter(|op| op.unit == UnitId(unit) && op.is_leader())
                .collect();
            assert_eq!(leaders.len(), 1);
            assert_eq!(leaders[0].id, roster.leader_of(UnitId(unit)));
        }
    }

    #[test]
    fn test_out_of_range_ids() {
        let roster = Roster::new(4, 2, 4).unwrap();
        assert!(roster.operative(OperativeId(0)).is_none());
        assert!(roster.operative(OperativeId(5)).is_none());
        assert_eq!(roster.iter().count(), 4);
    }
}
