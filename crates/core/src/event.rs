//! Observable simulation events.

use shadows_types::{OperativeId, StaffId, StationId, UnitId};
use std::fmt;

/// Everything that can appear in the event log.
///
/// Variants are grouped by the resource they describe. `Display` renders
/// the human-readable line; the wording is not a stable format, tooling
/// should match on the variants instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Stations
    // ═══════════════════════════════════════════════════════════════════════
    /// Operative finished its arrival delay and walked up to its station.
    Arrived {
        operative: OperativeId,
        station: StationId,
    },

    /// Operative asks for its station.
    StationRequested {
        operative: OperativeId,
        station: StationId,
    },

    /// Station is held by someone else; the operative blocks.
    StationBusy {
        operative: OperativeId,
        station: StationId,
    },

    /// Operative now holds the station exclusively.
    StationAcquired {
        operative: OperativeId,
        station: StationId,
    },

    /// Operative finished document recreation (still holding the station).
    WorkCompleted {
        operative: OperativeId,
        station: StationId,
    },

    /// Operative gave the station back.
    StationReleased {
        operative: OperativeId,
        station: StationId,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Unit barrier
    // ═══════════════════════════════════════════════════════════════════════
    /// Non-leader signalled its unit. `count` is the arrival count after it.
    MemberArrived {
        operative: OperativeId,
        unit: UnitId,
        count: u32,
    },

    /// Leader signalled its unit and waits for the rest.
    LeaderWaiting {
        operative: OperativeId,
        unit: UnitId,
        count: u32,
    },

    /// Leader observed all `count` arrivals and passed the barrier.
    UnitAssembled {
        operative: OperativeId,
        unit: UnitId,
        count: u32,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Ledger writes
    // ═══════════════════════════════════════════════════════════════════════
    /// Leader asks for exclusive ledger access.
    WriteRequested {
        operative: OperativeId,
        unit: UnitId,
    },

    /// Leader blocks behind active readers or another writer.
    WriteBlocked {
        operative: OperativeId,
        unit: UnitId,
        readers: u32,
        writer_active: bool,
    },

    /// Leader holds exclusive ledger access.
    WriteBegan {
        operative: OperativeId,
        unit: UnitId,
    },

    /// Leader recorded its unit and released the ledger.
    WriteEnded {
        operative: OperativeId,
        unit: UnitId,
        completed: u32,
    },

    /// Leader gave up the ledger without recording its unit.
    WriteAbandoned {
        operative: OperativeId,
        unit: UnitId,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Ledger reads
    // ═══════════════════════════════════════════════════════════════════════
    /// Staff asks for shared ledger access.
    ReadRequested { staff: StaffId },

    /// Staff blocks because a writer is active or waiting.
    ReadBlocked {
        staff: StaffId,
        writer_active: bool,
        writers_waiting: u32,
    },

    /// Staff holds shared access; `completed` is the counter it observed.
    ReadBegan {
        staff: StaffId,
        completed: u32,
        readers: u32,
    },

    /// Staff released shared access; `readers` is the count left behind.
    ReadEnded { staff: StaffId, readers: u32 },

    /// Staff observed the stop signal and left.
    StaffStopped { staff: StaffId },
}

impl Event {
    /// Short variant name, used as a tracing field.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Arrived { .. } => "Arrived",
            Event::StationRequested { .. } => "StationRequested",
            Event::StationBusy { .. } => "StationBusy",
            Event::StationAcquired { .. } => "StationAcquired",
            Event::WorkCompleted { .. } => "WorkCompleted",
            Event::StationReleased { .. } => "StationReleased",
            Event::MemberArrived { .. } => "MemberArrived",
            Event::LeaderWaiting { .. } => "LeaderWaiting",
            Event::UnitAssembled { .. } => "UnitAssembled",
            Event::WriteRequested { .. } => "WriteRequested",
            Event::WriteBlocked { .. } => "WriteBlocked",
            Event::WriteBegan { .. } => "WriteBegan",
            Event::WriteEnded { .. } => "WriteEnded",
            Event::WriteAbandoned { .. } => "WriteAbandoned",
            Event::ReadRequested { .. } => "ReadRequested",
            Event::ReadBlocked { .. } => "ReadBlocked",
            Event::ReadBegan { .. } => "ReadBegan",
            Event::ReadEnded { .. } => "ReadEnded",
            Event::StaffStopped { .. } => "StaffStopped",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Arrived { operative, station } => {
                write!(f, "{operative} has arrived at typewriting {station}")
            }
            Event::StationRequested { operative, station } => {
                write!(f, "{operative} is requesting {station}")
            }
            Event::StationBusy { operative, station } => {
                write!(f, "{operative} is waiting for {station}")
            }
            Event::StationAcquired { operative, station } => {
                write!(f, "{operative} has acquired {station}")
            }
            Event::WorkCompleted { operative, station } => write!(
                f,
                "{operative} has completed document recreation at {station}"
            ),
            Event::StationReleased { operative, station } => {
                write!(f, "{operative} has released {station}")
            }
            Event::MemberArrived {
                operative,
                unit,
                count,
            } => write!(
                f,
                "{operative} has finished and notified the leader of {unit} ({count} arrived)"
            ),
            Event::LeaderWaiting {
                operative,
                unit,
                count,
            } => write!(
                f,
                "Leader {operative} is waiting for {unit} to finish ({count} arrived)"
            ),
            Event::UnitAssembled {
                operative,
                unit,
                count,
            } => write!(
                f,
                "{unit} has completed document recreation phase (leader {operative}, {count} arrived)"
            ),
            Event::WriteRequested { operative, unit } => {
                write!(f, "Leader {operative} of {unit} is requesting the logbook")
            }
            Event::WriteBlocked {
                operative,
                readers,
                writer_active,
                ..
            } => write!(
                f,
                "Leader {operative} is waiting for the logbook (readers = {readers}, writer active = {writer_active})"
            ),
            Event::WriteBegan { operative, unit } => {
                write!(f, "Leader {operative} of {unit} began writing the logbook")
            }
            Event::WriteEnded {
                unit, completed, ..
            } => write!(
                f,
                "{unit} has completed intelligence distribution. Operations completed = {completed}"
            ),
            Event::WriteAbandoned { operative, unit } => write!(
                f,
                "Leader {operative} abandoned the logbook, {unit} not recorded"
            ),
            Event::ReadRequested { staff } => {
                write!(f, "{staff} is requesting the logbook")
            }
            Event::ReadBlocked {
                staff,
                writer_active,
                writers_waiting,
            } => write!(
                f,
                "{staff} is waiting to read the logbook (writer active = {writer_active}, writers waiting = {writers_waiting})"
            ),
            Event::ReadBegan {
                staff,
                completed,
                readers,
            } => write!(
                f,
                "{staff} began reviewing logbook. Operations completed = {completed} (readers = {readers})"
            ),
            Event::ReadEnded { staff, readers } => write!(
                f,
                "{staff} finished reviewing logbook (readers = {readers})"
            ),
            Event::StaffStopped { staff } => write!(f, "{staff} has gone off duty"),
        }
    }
}

/// An event as recorded by the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamped<E = Event> {
    /// Position in the total order of the log (0-based).
    pub seq: u64,
    /// Milliseconds since the run started.
    pub at_ms: u64,
    /// The event itself.
    pub event: E,
}

impl<E: fmt::Display> fmt::Display for Stamped<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>6} ms] {}", self.at_ms, self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_participants() {
        let event = Event::StationAcquired {
            operative: OperativeId(3),
            station: StationId(3),
        };
        assert_eq!(event.to_string(), "Operative 3 has acquired station 4");

        let event = Event::WriteEnded {
            operative: OperativeId(5),
            unit: UnitId(0),
            completed: 1,
        };
        assert!(event
            .to_string()
            .starts_with("Unit 1 has completed intelligence distribution"));
    }

    #[test]
    fn test_stamped_display() {
        let stamped = Stamped {
            seq: 0,
            at_ms: 42,
            event: Event::StaffStopped { staff: StaffId(1) },
        };
        assert_eq!(
            stamped.to_string(),
            "[    42 ms] Intelligence Staff 1 has gone off duty"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(
            Event::ReadRequested { staff: StaffId(2) }.kind(),
            "ReadRequested"
        );
    }
}
