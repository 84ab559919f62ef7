//! Offline verification of a recorded event log.
//!
//! The primitives emit their transitions while holding their own locks, so
//! the log order is the real transition order. Replaying it against a
//! shadow copy of each resource's state exposes any interleaving that the
//! synchronization engine should have made impossible.
//!
//! Checked properties:
//!
//! - log sequence is gap-free and timestamps never go backwards
//! - a station never has two holders, and only the holder releases it
//! - unit arrival counts climb by one, never exceed the group size, and the
//!   leader passes only after all arrivals, and only once
//! - ledger readers and writers never overlap; no read is admitted while a
//!   writer is queued; every read sees the latest counter
//! - the counter climbs by one per finished write, each unit writes once
//!   and only after assembling, and the final count equals the number of
//!   units
//! - at the end every station is free and the ledger is idle

use shadows_core::{Event, Stamped};
use shadows_types::{OperativeId, Roster, StaffId, StationId, UnitId};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::warn;

/// One broken invariant, with the log position where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Sequence numbers skip or repeat.
    #[error("entry {seq}: expected sequence number {expected}")]
    SequenceGap { seq: u64, expected: u64 },

    /// Timestamp smaller than its predecessor.
    #[error("entry {seq}: timestamp {at_ms} ms is before previous {previous_ms} ms")]
    ClockWentBackwards {
        seq: u64,
        at_ms: u64,
        previous_ms: u64,
    },

    /// Event names a station, unit or operative outside the roster.
    #[error("entry {seq}: refers to something outside the roster")]
    OutOfRoster { seq: u64 },

    /// Station acquired while someone else held it.
    #[error("entry {seq}: {intruder} acquired {station} held by {holder}")]
    StationDoubleHeld {
        seq: u64,
        station: StationId,
        holder: OperativeId,
        intruder: OperativeId,
    },

    /// Station released by an operative that did not hold it.
    #[error("entry {seq}: {operative} released {station} without holding it")]
    StationReleasedByNonHolder {
        seq: u64,
        station: StationId,
        operative: OperativeId,
    },

    /// Logged arrival count disagrees with the replayed count.
    #[error("entry {seq}: {unit} logged {logged} arrivals, replay has {replayed}")]
    ArrivalCountMismatch {
        seq: u64,
        unit: UnitId,
        logged: u32,
        replayed: u32,
    },

    /// More arrivals than members.
    #[error("entry {seq}: {unit} exceeded its group size")]
    BarrierOverrun { seq: u64, unit: UnitId },

    /// Leader passed the barrier before every member arrived.
    #[error("entry {seq}: {unit} assembled with only {arrivals} arrivals")]
    PrematureAssembly {
        seq: u64,
        unit: UnitId,
        arrivals: u32,
    },

    /// Someone other than the unit's leader waited or passed.
    #[error("entry {seq}: {operative} acted as leader of {unit}")]
    NotTheLeader {
        seq: u64,
        unit: UnitId,
        operative: OperativeId,
    },

    /// A unit assembled twice.
    #[error("entry {seq}: {unit} assembled twice")]
    AssembledTwice { seq: u64, unit: UnitId },

    /// Read granted while a writer held the ledger.
    #[error("entry {seq}: {staff} read while {writer} was writing")]
    ReadDuringWrite {
        seq: u64,
        staff: StaffId,
        writer: OperativeId,
    },

    /// Read granted while a writer was queued.
    #[error("entry {seq}: {staff} admitted ahead of {waiting} waiting writer(s)")]
    ReadPastWaitingWriter {
        seq: u64,
        staff: StaffId,
        waiting: usize,
    },

    /// Read observed a counter other than the latest one.
    #[error("entry {seq}: {staff} read {observed}, ledger holds {actual}")]
    StaleRead {
        seq: u64,
        staff: StaffId,
        observed: u32,
        actual: u32,
    },

    /// Logged reader count disagrees with the replay.
    #[error("entry {seq}: logged {logged} readers, replay has {replayed}")]
    ReaderCountMismatch {
        seq: u64,
        logged: u32,
        replayed: u32,
    },

    /// Read ended with no read outstanding.
    #[error("entry {seq}: {staff} ended a read it never began")]
    UnmatchedReadEnd { seq: u64, staff: StaffId },

    /// Write granted while readers or another writer were inside.
    #[error("entry {seq}: {operative} began writing with {readers} reader(s), writer active = {writer_active}")]
    WriteDuringAccess {
        seq: u64,
        operative: OperativeId,
        readers: u32,
        writer_active: bool,
    },

    /// Write ended by someone other than the active writer.
    #[error("entry {seq}: {operative} ended a write it does not hold")]
    UnmatchedWriteEnd { seq: u64, operative: OperativeId },

    /// Leader wrote before its unit assembled.
    #[error("entry {seq}: {unit} wrote before assembling")]
    WriteBeforeAssembly { seq: u64, unit: UnitId },

    /// Counter did not advance by exactly one.
    #[error("entry {seq}: counter went from {previous} to {logged}")]
    CounterSkipped {
        seq: u64,
        previous: u32,
        logged: u32,
    },

    /// A unit was recorded twice.
    #[error("entry {seq}: {unit} recorded twice")]
    UnitRecordedTwice { seq: u64, unit: UnitId },

    /// A unit never assembled.
    #[error("{unit} never assembled")]
    UnitNeverAssembled { unit: UnitId },

    /// A unit never reached the ledger.
    #[error("{unit} never recorded")]
    UnitNeverRecorded { unit: UnitId },

    /// A station was still held when the log ended.
    #[error("{station} still held by {holder} at end of log")]
    StationLeftHeld {
        station: StationId,
        holder: OperativeId,
    },

    /// The ledger was not idle when the log ended.
    #[error("ledger not idle at end of log ({readers} readers, writer active = {writer_active})")]
    LedgerLeftBusy { readers: u32, writer_active: bool },
}

/// Outcome of replaying a log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Everything that went wrong, in log order.
    pub violations: Vec<Violation>,
    /// Final counter value seen in the log.
    pub completed: u32,
    /// Reads granted.
    pub reads: u64,
    /// Most readers inside the ledger at once.
    pub max_concurrent_readers: u32,
    /// Times an operative found its station busy.
    pub station_waits: u64,
}

impl AuditReport {
    /// Whether the log satisfied every property.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Default)]
struct Replay {
    report: AuditReport,
    station_holders: BTreeMap<StationId, OperativeId>,
    arrivals: BTreeMap<UnitId, u32>,
    assembled: BTreeSet<UnitId>,
    recorded: BTreeSet<UnitId>,
    readers: BTreeMap<StaffId, u32>,
    reader_count: u32,
    writer: Option<(OperativeId, UnitId)>,
    waiting_writers: BTreeSet<OperativeId>,
}

/// Replay `entries` against `roster` and collect every violation.
pub fn audit(entries: &[Stamped], roster: &Roster) -> AuditReport {
    let mut replay = Replay::default();
    let mut previous_ms = 0;

    for (expected, entry) in entries.iter().enumerate() {
        let seq = entry.seq;
        if seq != expected as u64 {
            replay.flag(Violation::SequenceGap {
                seq,
                expected: expected as u64,
            });
        }
        if entry.at_ms < previous_ms {
            replay.flag(Violation::ClockWentBackwards {
                seq,
                at_ms: entry.at_ms,
                previous_ms,
            });
        }
        previous_ms = previous_ms.max(entry.at_ms);

        replay.apply(seq, &entry.event, roster);
    }

    replay.finish(roster)
}

impl Replay {
    fn flag(&mut self, violation: Violation) {
        warn!(%violation, "Audit violation");
        self.report.violations.push(violation);
    }

    fn apply(&mut self, seq: u64, event: &Event, roster: &Roster) {
        match *event {
            Event::StationBusy { .. } => self.report.station_waits += 1,
            Event::StationAcquired { operative, station } => {
                if !self.in_roster_station(operative, station, roster) {
                    return self.flag(Violation::OutOfRoster { seq });
                }
                if let Some(&holder) = self.station_holders.get(&station) {
                    self.flag(Violation::StationDoubleHeld {
                        seq,
                        station,
                        holder,
                        intruder: operative,
                    });
                }
                self.station_holders.insert(station, operative);
            }
            Event::StationReleased { operative, station } => {
                if self.station_holders.get(&station) != Some(&operative) {
                    return self.flag(Violation::StationReleasedByNonHolder {
                        seq,
                        station,
                        operative,
                    });
                }
                self.station_holders.remove(&station);
            }

            Event::MemberArrived {
                operative,
                unit,
                count,
            } => self.arrive(seq, operative, unit, count, roster, false),
            Event::LeaderWaiting {
                operative,
                unit,
                count,
            } => self.arrive(seq, operative, unit, count, roster, true),
            Event::UnitAssembled {
                operative,
                unit,
                count,
            } => {
                let arrivals = self.arrivals.get(&unit).copied().unwrap_or(0);
                if arrivals != roster.group_size() || count != roster.group_size() {
                    self.flag(Violation::PrematureAssembly {
                        seq,
                        unit,
                        arrivals,
                    });
                }
                if roster.leader_of(unit) != operative {
                    self.flag(Violation::NotTheLeader {
                        seq,
                        unit,
                        operative,
                    });
                }
                if !self.assembled.insert(unit) {
                    self.flag(Violation::AssembledTwice { seq, unit });
                }
            }

            Event::WriteBlocked { operative, .. } => {
                self.waiting_writers.insert(operative);
            }
            Event::WriteBegan { operative, unit } => {
                self.waiting_writers.remove(&operative);
                if self.reader_count > 0 || self.writer.is_some() {
                    self.flag(Violation::WriteDuringAccess {
                        seq,
                        operative,
                        readers: self.reader_count,
                        writer_active: self.writer.is_some(),
                    });
                }
                if !self.assembled.contains(&unit) {
                    self.flag(Violation::WriteBeforeAssembly { seq, unit });
                }
                self.writer = Some((operative, unit));
            }
            Event::WriteEnded {
                operative,
                unit,
                completed,
            } => {
                if self.writer != Some((operative, unit)) {
                    self.flag(Violation::UnmatchedWriteEnd { seq, operative });
                }
                self.writer = None;
                let previous = self.report.completed;
                if completed != previous + 1 {
                    self.flag(Violation::CounterSkipped {
                        seq,
                        previous,
                        logged: completed,
                    });
                }
                self.report.completed = completed;
                if !self.recorded.insert(unit) {
                    self.flag(Violation::UnitRecordedTwice { seq, unit });
                }
            }
            Event::WriteAbandoned { operative, unit } => {
                if self.writer != Some((operative, unit)) {
                    self.flag(Violation::UnmatchedWriteEnd { seq, operative });
                }
                self.writer = None;
            }

            Event::ReadBegan {
                staff,
                completed,
                readers,
            } => {
                if let Some((writer, _)) = self.writer {
                    self.flag(Violation::ReadDuringWrite { seq, staff, writer });
                }
                if !self.waiting_writers.is_empty() {
                    self.flag(Violation::ReadPastWaitingWriter {
                        seq,
                        staff,
                        waiting: self.waiting_writers.len(),
                    });
                }
                if completed != self.report.completed {
                    self.flag(Violation::StaleRead {
                        seq,
                        staff,
                        observed: completed,
                        actual: self.report.completed,
                    });
                }
                self.reader_count += 1;
                *self.readers.entry(staff).or_default() += 1;
                if readers != self.reader_count {
                    self.flag(Violation::ReaderCountMismatch {
                        seq,
                        logged: readers,
                        replayed: self.reader_count,
                    });
                }
                self.report.reads += 1;
                self.report.max_concurrent_readers =
                    self.report.max_concurrent_readers.max(self.reader_count);
            }
            Event::ReadEnded { staff, readers } => {
                let open = self.readers.entry(staff).or_default();
                if *open == 0 {
                    return self.flag(Violation::UnmatchedReadEnd { seq, staff });
                }
                *open -= 1;
                self.reader_count -= 1;
                if readers != self.reader_count {
                    self.flag(Violation::ReaderCountMismatch {
                        seq,
                        logged: readers,
                        replayed: self.reader_count,
                    });
                }
            }

            Event::Arrived { .. }
            | Event::StationRequested { .. }
            | Event::WorkCompleted { .. }
            | Event::WriteRequested { .. }
            | Event::ReadRequested { .. }
            | Event::ReadBlocked { .. }
            | Event::StaffStopped { .. } => {}
        }
    }

    fn arrive(
        &mut self,
        seq: u64,
        operative: OperativeId,
        unit: UnitId,
        count: u32,
        roster: &Roster,
        as_leader: bool,
    ) {
        let Some(member) = roster.operative(operative) else {
            return self.flag(Violation::OutOfRoster { seq });
        };
        if member.unit != unit {
            return self.flag(Violation::OutOfRoster { seq });
        }
        if member.is_leader() != as_leader {
            self.flag(Violation::NotTheLeader {
                seq,
                unit,
                operative,
            });
        }

        let replayed = {
            let arrivals = self.arrivals.entry(unit).or_default();
            *arrivals += 1;
            *arrivals
        };
        if replayed > roster.group_size() {
            self.flag(Violation::BarrierOverrun { seq, unit });
        }
        if count != replayed {
            self.flag(Violation::ArrivalCountMismatch {
                seq,
                unit,
                logged: count,
                replayed,
            });
        }
    }

    fn in_roster_station(
        &self,
        operative: OperativeId,
        station: StationId,
        roster: &Roster,
    ) -> bool {
        roster
            .operative(operative)
            .is_some_and(|member| member.station == station)
    }

    fn finish(mut self, roster: &Roster) -> AuditReport {
        for unit in (0..roster.units()).map(UnitId) {
            if !self.assembled.contains(&unit) {
                self.flag(Violation::UnitNeverAssembled { unit });
            }
            if !self.recorded.contains(&unit) {
                self.flag(Violation::UnitNeverRecorded { unit });
            }
        }
        let held = std::mem::take(&mut self.station_holders);
        for (station, holder) in held {
            self.flag(Violation::StationLeftHeld { station, holder });
        }
        if self.reader_count > 0 || self.writer.is_some() {
            self.flag(Violation::LedgerLeftBusy {
                readers: self.reader_count,
                writer_active: self.writer.is_some(),
            });
        }
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(events: Vec<Event>) -> Vec<Stamped> {
        events
            .into_iter()
            .enumerate()
            .map(|(i, event)| Stamped {
                seq: i as u64,
                at_ms: i as u64,
                event,
            })
            .collect()
    }

    /// A complete, correct run of two operatives forming one unit.
    fn clean_run() -> Vec<Event> {
        let (a, b) = (OperativeId(1), OperativeId(2));
        let (sa, sb) = (StationId(1), StationId(2));
        let unit = UnitId(0);
        vec![
            Event::StationAcquired {
                operative: a,
                station: sa,
            },
            Event::StationAcquired {
                operative: b,
                station: sb,
            },
            Event::StationReleased {
                operative: a,
                station: sa,
            },
            Event::MemberArrived {
                operative: a,
                unit,
                count: 1,
            },
            Event::ReadBegan {
                staff: StaffId(1),
                completed: 0,
                readers: 1,
            },
            Event::StationReleased {
                operative: b,
                station: sb,
            },
            Event::LeaderWaiting {
                operative: b,
                unit,
                count: 2,
            },
            Event::UnitAssembled {
                operative: b,
                unit,
                count: 2,
            },
            Event::WriteBlocked {
                operative: b,
                unit,
                readers: 1,
                writer_active: false,
            },
            Event::ReadEnded {
                staff: StaffId(1),
                readers: 0,
            },
            Event::WriteBegan { operative: b, unit },
            Event::WriteEnded {
                operative: b,
                unit,
                completed: 1,
            },
            Event::ReadBegan {
                staff: StaffId(2),
                completed: 1,
                readers: 1,
            },
            Event::ReadEnded {
                staff: StaffId(2),
                readers: 0,
            },
        ]
    }

    fn roster() -> Roster {
        Roster::new(2, 2, 4).unwrap()
    }

    #[test]
    fn test_clean_run_passes() {
        let report = audit(&stamp(clean_run()), &roster());
        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.completed, 1);
        assert_eq!(report.reads, 2);
        assert_eq!(report.max_concurrent_readers, 1);
    }

    #[test]
    fn test_double_held_station() {
        let mut events = clean_run();
        // Operative 1 takes station 1 again before releasing it.
        events.insert(
            1,
            Event::StationAcquired {
                operative: OperativeId(1),
                station: StationId(1),
            },
        );
        let report = audit(&stamp(events), &roster());
        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::StationDoubleHeld { .. })));
    }

    #[test]
    fn test_read_past_waiting_writer() {
        let mut events = clean_run();
        // A second read admitted right after the writer queued.
        events.insert(
            9,
            Event::ReadBegan {
                staff: StaffId(2),
                completed: 0,
                readers: 2,
            },
        );
        events.insert(
            10,
            Event::ReadEnded {
                staff: StaffId(2),
                readers: 1,
            },
        );
        let report = audit(&stamp(events), &roster());
        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::ReadPastWaitingWriter { waiting: 1, .. })));
    }

    #[test]
    fn test_premature_assembly_and_missing_record() {
        let unit = UnitId(0);
        let events = vec![
            Event::LeaderWaiting {
                operative: OperativeId(2),
                unit,
                count: 1,
            },
            Event::UnitAssembled {
                operative: OperativeId(2),
                unit,
                count: 1,
            },
        ];
        let report = audit(&stamp(events), &roster());
        assert!(report.violations.contains(&Violation::PrematureAssembly {
            seq: 1,
            unit,
            arrivals: 1,
        }));
        assert!(report
            .violations
            .contains(&Violation::UnitNeverRecorded { unit }));
    }

    #[test]
    fn test_stale_read_and_backwards_clock() {
        let mut entries = stamp(clean_run());
        // The last read claims it saw nothing recorded.
        entries[12].event = Event::ReadBegan {
            staff: StaffId(2),
            completed: 0,
            readers: 1,
        };
        entries[13].at_ms = 0;
        let report = audit(&entries, &roster());
        assert!(report.violations.iter().any(|v| matches!(
            v,
            Violation::StaleRead {
                observed: 0,
                actual: 1,
                ..
            }
        )));
        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::ClockWentBackwards { seq: 13, .. })));
    }

    #[test]
    fn test_write_during_read() {
        let unit = UnitId(0);
        let b = OperativeId(2);
        let events = vec![
            Event::MemberArrived {
                operative: OperativeId(1),
                unit,
                count: 1,
            },
            Event::LeaderWaiting {
                operative: b,
                unit,
                count: 2,
            },
            Event::UnitAssembled {
                operative: b,
                unit,
                count: 2,
            },
            Event::ReadBegan {
                staff: StaffId(1),
                completed: 0,
                readers: 1,
            },
            Event::WriteBegan { operative: b, unit },
            Event::WriteEnded {
                operative: b,
                unit,
                completed: 1,
            },
            Event::ReadEnded {
                staff: StaffId(1),
                readers: 0,
            },
        ];
        let report = audit(&stamp(events), &roster());
        assert_eq!(
            report.violations,
            vec![Violation::WriteDuringAccess {
                seq: 4,
                operative: b,
                readers: 1,
                writer_active: false,
            }]
        );
    }

    #[test]
    fn test_abandoned_write_frees_ledger_but_records_nothing() {
        let mut events = clean_run();
        let unit = UnitId(0);
        events[11] = Event::WriteAbandoned {
            operative: OperativeId(2),
            unit,
        };
        // The following read now sees an unchanged counter.
        events[12] = Event::ReadBegan {
            staff: StaffId(2),
            completed: 0,
            readers: 1,
        };
        let report = audit(&stamp(events), &roster());
        assert_eq!(report.completed, 0);
        assert_eq!(
            report.violations,
            vec![Violation::UnitNeverRecorded { unit }]
        );
    }
}
