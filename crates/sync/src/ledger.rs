//! The master logbook: a completed-unit counter behind a fair
//! reader-writer lock.
//!
//! # States
//!
//! ```text
//!            read              read
//!   Idle ─────────▶ Reading(1) ─────▶ Reading(n+1)
//!    ▲ ▲                │ last end_read
//!    │ └────────────────┘   (wake one writer, else all readers)
//!    │
//!    │ end_write (counter += 1 if finished; wake one writer, else all readers)
//!    │
//!   Writing ◀──── write (no readers, no writer)
//! ```
//!
//! # Admission
//!
//! - A reader is admitted only when no writer is active **and none is
//!   waiting**. Once a leader queues up, new staff reads are held back, so
//!   the writer waits at most for the reads already in progress.
//! - A writer is admitted when there are no readers and no other writer.
//!   It counts itself as waiting from the moment it asks until it is
//!   granted.
//!
//! # Correctness Invariants
//!
//! - `writer.is_some()` and `readers > 0` are never true together
//! - the counter changes only when a write is finished, by exactly one;
//!   an abandoned write releases the lock and leaves it alone
//! - each unit is recorded at most once
//!
//! Access is only available through [`ReadAccess`] and [`WriteAccess`], so
//! the counter cannot be read without holding the lock.

use parking_lot::{Condvar, Mutex};
use shadows_core::{Event, EventLog};
use shadows_types::{OperativeId, StaffId, UnitId};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::SyncError;

#[derive(Debug, Default)]
struct LedgerState {
    completed: u32,
    readers: u32,
    writer: Option<(OperativeId, UnitId)>,
    writers_waiting: u32,
    /// Units that have asked to write; a unit may only be recorded once.
    claimed: BTreeSet<UnitId>,
}

impl LedgerState {
    fn reader_may_enter(&self) -> bool {
        self.writer.is_none() && self.writers_waiting == 0
    }

    fn writer_may_enter(&self) -> bool {
        self.writer.is_none() && self.readers == 0
    }
}

/// Point-in-time view of the lock, for reports and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStatus {
    /// Units recorded so far.
    pub completed: u32,
    /// Readers currently inside.
    pub readers: u32,
    /// Whether a writer is inside.
    pub writer_active: bool,
    /// Writers queued for access.
    pub writers_waiting: u32,
}

/// The shared logbook.
#[derive(Debug)]
pub struct Ledger {
    state: Mutex<LedgerState>,
    readers_cv: Condvar,
    writers_cv: Condvar,
    log: EventLog,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new(log: EventLog) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            readers_cv: Condvar::new(),
            writers_cv: Condvar::new(),
            log,
        }
    }

    /// Consistent snapshot of the lock state.
    pub fn status(&self) -> LedgerStatus {
        let state = self.state.lock();
        LedgerStatus {
            completed: state.completed,
            readers: state.readers,
            writer_active: state.writer.is_some(),
            writers_waiting: state.writers_waiting,
        }
    }

    /// Acquire shared access. Blocks while a writer is active or waiting.
    pub fn read(&self, staff: StaffId) -> ReadAccess<'_> {
        let mut state = self.state.lock();

        if !state.reader_may_enter() {
            debug!(
                %staff,
                writer_active = state.writer.is_some(),
                writers_waiting = state.writers_waiting,
                "Reader held back"
            );
            self.log.emit(Event::ReadBlocked {
                staff,
                writer_active: state.writer.is_some(),
                writers_waiting: state.writers_waiting,
            });
        }
        while !state.reader_may_enter() {
            self.readers_cv.wait(&mut state);
        }

        state.readers += 1;
        let completed = state.completed;
        self.log.emit(Event::ReadBegan {
            staff,
            completed,
            readers: state.readers,
        });

        ReadAccess {
            ledger: self,
            staff,
            completed,
            released: false,
        }
    }

    /// Acquire exclusive access on behalf of `unit`.
    ///
    /// Blocks while any reader or another writer is inside. Fails without
    /// blocking if `unit` has already asked to be recorded.
    pub fn write(
        &self,
        unit: UnitId,
        operative: OperativeId,
    ) -> Result<WriteAccess<'_>, SyncError> {
        let mut state = self.state.lock();
        if !state.claimed.insert(unit) {
            return Err(SyncError::UnitAlreadyRecorded { unit });
        }

        state.writers_waiting += 1;
        if !state.writer_may_enter() {
            debug!(
                %unit,
                %operative,
                readers = state.readers,
                writer_active = state.writer.is_some(),
                "Writer waiting"
            );
            self.log.emit(Event::WriteBlocked {
                operative,
                unit,
                readers: state.readers,
                writer_active: state.writer.is_some(),
            });
        }
        while !state.writer_may_enter() {
            self.writers_cv.wait(&mut state);
        }
        state.writers_waiting -= 1;
        state.writer = Some((operative, unit));

        self.log.emit(Event::WriteBegan { operative, unit });

        Ok(WriteAccess {
            ledger: self,
            operative,
            unit,
            released: false,
        })
    }

    fn end_read(&self, staff: StaffId) {
        let mut state = self.state.lock();
        debug_assert!(state.readers > 0, "end_read without a reader");
        state.readers -= 1;
        self.log.emit(Event::ReadEnded {
            staff,
            readers: state.readers,
        });

        if state.readers == 0 {
            self.wake_next(&state);
        }
    }

    /// Release the write lock. Only a finished write advances the counter.
    fn end_write(&self, operative: OperativeId, unit: UnitId, finished: bool) -> u32 {
        let mut state = self.state.lock();
        debug_assert_eq!(
            state.writer,
            Some((operative, unit)),
            "end_write by a non-writer"
        );
        state.writer = None;
        if finished {
            state.completed += 1;
            self.log.emit(Event::WriteEnded {
                operative,
                unit,
                completed: state.completed,
            });
        } else {
            warn!(%unit, %operative, "Write abandoned, unit not recorded");
            self.log.emit(Event::WriteAbandoned { operative, unit });
        }

        self.wake_next(&state);
        state.completed
    }

    /// Hand the lock on: one writer if any queued, else every reader.
    fn wake_next(&self, state: &LedgerState) {
        if state.writers_waiting > 0 {
            self.writers_cv.notify_one();
        } else {
            self.readers_cv.notify_all();
        }
    }
}

/// Shared access to the ledger. Dropping it ends the read.
#[derive(Debug)]
pub struct ReadAccess<'a> {
    ledger: &'a Ledger,
    staff: StaffId,
    completed: u32,
    released: bool,
}

impl ReadAccess<'_> {
    /// Completed units. Cannot change while any read is held.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Staff member holding the read.
    pub fn staff(&self) -> StaffId {
        self.staff
    }

    /// End the read now.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.ledger.end_read(self.staff);
        }
    }
}

impl Drop for ReadAccess<'_> {
    fn drop(&mut self) {
        self.release_once();
    }
}

/// Exclusive access to the ledger.
///
/// [`finish`](WriteAccess::finish) records the unit. Dropping an unfinished
/// access releases the lock without recording anything.
#[derive(Debug)]
pub struct WriteAccess<'a> {
    ledger: &'a Ledger,
    operative: OperativeId,
    unit: UnitId,
    released: bool,
}

impl WriteAccess<'_> {
    /// Completed units before this write is recorded.
    pub fn completed(&self) -> u32 {
        self.ledger.state.lock().completed
    }

    /// Unit being recorded.
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Record the unit, release the lock, and return the new count.
    pub fn finish(mut self) -> u32 {
        self.released = true;
        self.ledger.end_write(self.operative, self.unit, true)
    }
}

impl Drop for WriteAccess<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.ledger.end_write(self.operative, self.unit, false);
        }
    }
}
