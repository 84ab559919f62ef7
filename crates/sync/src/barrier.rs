//! Single-use arrival barriers, one per unit.
//!
//! Members call [`GroupBarrier::member_arrived`] and carry on. The leader
//! calls [`GroupBarrier::leader_wait`], which counts the leader's own
//! arrival and then blocks until the unit's counter reaches the group
//! size. Because every increment happens under the unit's mutex, all of a
//! member's work before its arrival happens-before the leader returns.
//!
//! The counter only ever climbs from 0 to the group size; there is no
//! reset.

use parking_lot::{Condvar, Mutex};
use shadows_core::{Event, EventLog};
use shadows_types::{OperativeId, UnitId};
use tracing::debug;

use crate::SyncError;

#[derive(Debug, Default)]
struct UnitBarrier {
    arrived: Mutex<u32>,
    assembled: Condvar,
}

/// Barrier table covering every unit of a run.
#[derive(Debug)]
pub struct GroupBarrier {
    units: Vec<UnitBarrier>,
    group_size: u32,
    log: EventLog,
}

impl GroupBarrier {
    /// Create `units` barriers, each expecting `group_size` arrivals.
    pub fn new(units: u32, group_size: u32, log: EventLog) -> Self {
        Self {
            units: (0..units).map(|_| UnitBarrier::default()).collect(),
            group_size,
            log,
        }
    }

    /// Arrivals each unit waits for.
    pub fn group_size(&self) -> u32 {
        self.group_size
    }

    fn unit(&self, unit: UnitId) -> Result<&UnitBarrier, SyncError> {
        self.units.get(unit.index()).ok_or(SyncError::UnknownUnit {
            unit,
            units: self.units.len() as u32,
        })
    }

    /// Record a non-leader arrival without blocking.
    ///
    /// Returns the arrival count including this one.
    pub fn member_arrived(&self, unit: UnitId, operative: OperativeId) -> Result<u32, SyncError> {
        let barrier = self.unit(unit)?;
        let mut arrived = barrier.arrived.lock();
        self.count_arrival(unit, &mut arrived)?;

        self.log.emit(Event::MemberArrived {
            operative,
            unit,
            count: *arrived,
        });
        if *arrived == self.group_size {
            barrier.assembled.notify_all();
        }
        Ok(*arrived)
    }

    /// Record the leader's arrival and block until the whole unit is in.
    ///
    /// Returns immediately when the leader is the last to arrive. The
    /// returned count is always the group size.
    pub fn leader_wait(&self, unit: UnitId, operative: OperativeId) -> Result<u32, SyncError> {
        let barrier = self.unit(unit)?;
        let mut arrived = barrier.arrived.lock();
        self.count_arrival(unit, &mut arrived)?;

        self.log.emit(Event::LeaderWaiting {
            operative,
            unit,
            count: *arrived,
        });
        if *arrived < self.group_size {
            debug!(%unit, %operative, arrived = *arrived, "Leader waiting on unit");
        }
        while *arrived < self.group_size {
            barrier.assembled.wait(&mut arrived);
        }

        self.log.emit(Event::UnitAssembled {
            operative,
            unit,
            count: *arrived,
        });
        Ok(*arrived)
    }

    /// Current arrival count of a unit.
    pub fn arrivals(&self, unit: UnitId) -> Result<u32, SyncError> {
        Ok(*self.unit(unit)?.arrived.lock())
    }

    fn count_arrival(&self, unit: UnitId, arrived: &mut u32) -> Result<(), SyncError> {
        if *arrived >= self.group_size {
            return Err(SyncError::BarrierOverrun {
                unit,
                group_size: self.group_size,
            });
        }
        *arrived += 1;
        Ok(())
    }
}
