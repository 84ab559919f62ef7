//! Orchestration of one simulation run.

use crate::tasks::{run_operative, run_staff, Shared};
use crate::{ConfigError, RunError, SimulationConfig};
use shadows_core::{EventLog, EventSink};
use shadows_sync::{GroupBarrier, Ledger, StationPool, StopSignal};
use shadows_types::{Roster, StaffId};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Units recorded in the ledger.
    pub completed_units: u32,
    /// Units in the run.
    pub expected_units: u32,
    /// Entries written to the event log.
    pub events: u64,
    /// Ledger reads made by all staff together.
    pub staff_reads: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Runs a single simulation.
///
/// Construction validates the configuration, so a runner that exists
/// will never spawn threads for an impossible shape.
#[derive(Debug)]
pub struct SimulationRunner {
    config: SimulationConfig,
    roster: Roster,
    log: EventLog,
}

impl SimulationRunner {
    /// Validate `config` and prepare a run writing to `sink`.
    pub fn new(
        config: SimulationConfig,
        sink: impl EventSink + 'static,
    ) -> Result<Self, ConfigError> {
        let roster = config.validate()?;
        Ok(Self {
            config,
            roster,
            log: EventLog::new(sink),
        })
    }

    /// The validated roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The run's event log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Run to completion.
    ///
    /// All operatives are joined before staff are told to stop; staff
    /// finish their current read before leaving.
    pub fn run(self) -> Result<RunReport, RunError> {
        let Self {
            config,
            roster,
            log,
        } = self;

        info!(
            operatives = roster.operatives(),
            group_size = roster.group_size(),
            units = roster.units(),
            stations = roster.stations(),
            staff = config.staff,
            "Starting simulation"
        );

        let stations = StationPool::new(roster.stations(), log.clone());
        let barrier = GroupBarrier::new(roster.units(), roster.group_size(), log.clone());
        let ledger = Ledger::new(log.clone());
        let stop = StopSignal::new();
        let shared = Shared {
            config: &config,
            log: &log,
            stations: &stations,
            barrier: &barrier,
            ledger: &ledger,
            stop: &stop,
        };

        let (failure, staff_reads) = thread::scope(|s| {
            // Staff streams come after the operative streams.
            let staff: Vec<_> = (1..=config.staff)
                .map(|n| {
                    let delays = config.delays.source(u64::from(roster.operatives() + n));
                    let handle = s.spawn(move || run_staff(shared, StaffId(n), delays));
                    (n, handle)
                })
                .collect();

            let operatives: Vec<_> = roster
                .iter()
                .map(|operative| {
                    let delays = config.delays.source(u64::from(operative.id.get()));
                    let handle = s.spawn(move || run_operative(shared, operative, delays));
                    (operative.id, handle)
                })
                .collect();

            let mut failure = None;
            for (id, handle) in operatives {
                let error = match handle.join() {
                    Ok(Ok(())) => continue,
                    Ok(Err(e)) => RunError::Sync(e),
                    Err(_) => RunError::TaskPanicked {
                        task: id.to_string(),
                    },
                };
                warn!(%id, error = %error, "Operative failed");
                failure.get_or_insert(error);
            }
            info!("All operatives finished, stopping staff");
            stop.stop();

            let mut reads = 0;
            for (n, handle) in staff {
                match handle.join() {
                    Ok(count) => reads += count,
                    Err(_) => {
                        failure.get_or_insert(RunError::TaskPanicked {
                            task: StaffId(n).to_string(),
                        });
                    }
                }
            }
            (failure, reads)
        });

        if let Some(error) = failure {
            return Err(error);
        }
        log.finish()?;

        let completed_units = ledger.status().completed;
        let report = RunReport {
            completed_units,
            expected_units: roster.units(),
            events: log.len(),
            staff_reads,
            elapsed: log.elapsed(),
        };
        info!(
            completed_units,
            events = report.events,
            staff_reads,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Simulation finished"
        );

        if completed_units != report.expected_units {
            return Err(RunError::IncompleteLedger {
                completed: completed_units,
                expected: report.expected_units,
            });
        }
        Ok(report)
    }
}
