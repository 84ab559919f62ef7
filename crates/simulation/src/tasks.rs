//! Task bodies for operatives and staff.

use crate::{DelaySource, SimulationConfig};
use shadows_core::{Event, EventLog};
use shadows_sync::{GroupBarrier, Ledger, StationPool, StopSignal, SyncError};
use shadows_types::{Operative, Role, StaffId};
use std::thread;
use tracing::{debug, trace};

/// Everything a task needs, borrowed from the runner for one run.
#[derive(Clone, Copy)]
pub(crate) struct Shared<'a> {
    pub config: &'a SimulationConfig,
    pub log: &'a EventLog,
    pub stations: &'a StationPool,
    pub barrier: &'a GroupBarrier,
    pub ledger: &'a Ledger,
    pub stop: &'a StopSignal,
}

/// One operative, start to finish.
///
/// arrival delay → station → hold → release → barrier, and for the
/// leader: ledger write → hold → record.
pub(crate) fn run_operative(
    shared: Shared<'_>,
    operative: Operative,
    mut delays: DelaySource,
) -> Result<(), SyncError> {
    let Operative {
        id, unit, station, ..
    } = operative;

    thread::sleep(delays.next_delay(shared.config.arrival_spread()));
    shared.log.emit(Event::Arrived {
        operative: id,
        station,
    });
    shared.log.emit(Event::StationRequested {
        operative: id,
        station,
    });

    let permit = shared.stations.acquire(station, id)?;
    thread::sleep(shared.config.station_hold);
    shared.log.emit(Event::WorkCompleted {
        operative: id,
        station,
    });
    permit.release();

    match operative.role {
        Role::Member => {
            shared.barrier.member_arrived(unit, id)?;
            trace!(%id, %unit, "Member done");
        }
        Role::Leader => {
            shared.barrier.leader_wait(unit, id)?;

            shared.log.emit(Event::WriteRequested {
                operative: id,
                unit,
            });
            let access = shared.ledger.write(unit, id)?;
            thread::sleep(shared.config.ledger_hold);
            let completed = access.finish();
            debug!(%id, %unit, completed, "Unit recorded");
        }
    }
    Ok(())
}

/// One staff member: read the ledger at random intervals until stopped.
///
/// Returns the number of completed reads.
pub(crate) fn run_staff(shared: Shared<'_>, staff: StaffId, mut delays: DelaySource) -> u64 {
    let mut reads = 0;
    // The stop signal is only consulted between reads.
    while !shared.stop.sleep(delays.next_delay(shared.config.staff_spread())) {
        shared.log.emit(Event::ReadRequested { staff });
        let access = shared.ledger.read(staff);
        reads += 1;
        access.release();
    }
    shared.log.emit(Event::StaffStopped { staff });
    debug!(%staff, reads, "Staff stopped");
    reads
}
