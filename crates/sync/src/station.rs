//! Pool of mutually exclusive typewriting stations.
//!
//! # Correctness Invariants
//!
//! - **Exclusive**: a station has at most one holder at any instant
//! - **Re-checked**: waiters loop on the busy flag after every wakeup
//! - **No starvation by omission**: every release wakes every waiter of
//!   that station; one of them wins, the rest go back to sleep
//! - **Leak-free**: [`StationPermit`] releases on drop

use parking_lot::{Condvar, Mutex};
use shadows_core::{Event, EventLog};
use shadows_types::{OperativeId, StationId};
use tracing::debug;

use crate::SyncError;

/// One station: who holds it, and where waiters sleep.
#[derive(Debug, Default)]
struct Station {
    holder: Mutex<Option<OperativeId>>,
    freed: Condvar,
}

/// Fixed set of identical stations, each with its own lock.
#[derive(Debug)]
pub struct StationPool {
    stations: Vec<Station>,
    log: EventLog,
}

impl StationPool {
    /// Create `count` free stations.
    pub fn new(count: u32, log: EventLog) -> Self {
        Self {
            stations: (0..count).map(|_| Station::default()).collect(),
            log,
        }
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the pool has no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    fn station(&self, station: StationId) -> Result<&Station, SyncError> {
        self.stations
            .get(station.index())
            .ok_or(SyncError::UnknownStation {
                station,
                stations: self.stations.len() as u32,
            })
    }

    /// Block until `station` is free, then take it.
    pub fn acquire(
        &self,
        station: StationId,
        operative: OperativeId,
    ) -> Result<StationPermit<'_>, SyncError> {
        let slot = self.station(station)?;
        let mut holder = slot.holder.lock();

        if let Some(current) = *holder {
            debug!(%operative, %station, holder = %current, "Station busy");
            self.log.emit(Event::StationBusy { operative, station });
        }
        while holder.is_some() {
            slot.freed.wait(&mut holder);
        }

        *holder = Some(operative);
        self.log.emit(Event::StationAcquired { operative, station });

        Ok(StationPermit {
            pool: self,
            station,
            operative,
            released: false,
        })
    }

    /// Current holder of a station, if any.
    pub fn holder(&self, station: StationId) -> Result<Option<OperativeId>, SyncError> {
        Ok(*self.station(station)?.holder.lock())
    }

    fn release(&self, station: StationId, operative: OperativeId) {
        // The permit proved the index valid when it was issued.
        let slot = &self.stations[station.index()];
        let mut holder = slot.holder.lock();
        debug_assert_eq!(*holder, Some(operative), "released by a non-holder");

        self.log.emit(Event::StationReleased { operative, station });
        *holder = None;
        slot.freed.notify_all();
    }
}

/// Exclusive hold on one station. Dropping it releases the station.
#[derive(Debug)]
pub struct StationPermit<'a> {
    pool: &'a StationPool,
    station: StationId,
    operative: OperativeId,
    released: bool,
}

impl StationPermit<'_> {
    /// Station being held.
    pub fn station(&self) -> StationId {
        self.station
    }

    /// Operative holding it.
    pub fn operative(&self) -> OperativeId {
        self.operative
    }

    /// Release the station now.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.pool.release(self.station, self.operative);
        }
    }
}

impl Drop for StationPermit<'_> {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadows_core::MemorySink;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;
    use std::time::Duration;
    use tracing_test::traced_test;

    fn pool(count: u32) -> (StationPool, MemorySink) {
        let sink = MemorySink::new();
        (StationPool::new(count, EventLog::new(sink.clone())), sink)
    }

    #[test]
    fn test_acquire_and_release() {
        let (pool, sink) = pool(4);
        let permit = pool.acquire(StationId(2), OperativeId(6)).unwrap();
        assert_eq!(permit.station(), StationId(2));
        assert_eq!(pool.holder(StationId(2)).unwrap(), Some(OperativeId(6)));
        permit.release();
        assert_eq!(pool.holder(StationId(2)).unwrap(), None);

        let kinds: Vec<_> = sink.entries().iter().map(|e| e.event.kind()).collect();
        assert_eq!(kinds, vec!["StationAcquired", "StationReleased"]);
    }

    #[test]
    fn test_drop_releases() {
        let (pool, _sink) = pool(1);
        {
            let _permit = pool.acquire(StationId(0), OperativeId(1)).unwrap();
        }
        assert_eq!(pool.holder(StationId(0)).unwrap(), None);
    }

    #[test]
    fn test_unknown_station() {
        let (pool, _sink) = pool(4);
        let err = pool.acquire(StationId(4), OperativeId(1)).unwrap_err();
        assert_eq!(
            err,
            SyncError::UnknownStation {
                station: StationId(4),
                stations: 4,
            }
        );
    }

    #[test]
    fn test_mutual_exclusion_under_contention() {
        let (pool, sink) = pool(2);
        let inside = [AtomicU32::new(0), AtomicU32::new(0)];

        thread::scope(|s| {
            for id in 1..=12u32 {
                let pool = &pool;
                let inside = &inside;
                s.spawn(move || {
                    let station = StationId(id % 2);
                    for _ in 0..5 {
                        let permit = pool.acquire(station, OperativeId(id)).unwrap();
                        let slot = &inside[station.index()];
                        assert_eq!(slot.fetch_add(1, Ordering::SeqCst), 0);
                        thread::sleep(Duration::from_micros(50));
                        assert_eq!(slot.fetch_sub(1, Ordering::SeqCst), 1);
                        drop(permit);
                    }
                });
            }
        });

        // Replaying the log must also never show two holders.
        let mut holders: [Option<OperativeId>; 2] = [None, None];
        for entry in sink.entries() {
            match entry.event {
                Event::StationAcquired { operative, station } => {
                    assert!(holders[station.index()].is_none());
                    holders[station.index()] = Some(operative);
                }
                Event::StationReleased { operative, station } => {
                    assert_eq!(holders[station.index()], Some(operative));
                    holders[station.index()] = None;
                }
                _ => {}
            }
        }
        assert_eq!(holders, [None, None]);
    }

    #[traced_test]
    #[test]
    fn test_waiter_logs_busy_and_proceeds_after_release() {
        let (pool, sink) = pool(1);
        let first = pool.acquire(StationId(0), OperativeId(4)).unwrap();

        let span = tracing::Span::current();
        thread::scope(|s| {
            let waiter = s.spawn(|| {
                let _entered = span.enter();
                let permit = pool.acquire(StationId(0), OperativeId(8)).unwrap();
                permit.operative()
            });

            // Wait until the second operative has reported itself blocked.
            while !sink
                .entries()
                .iter()
                .any(|e| matches!(e.event, Event::StationBusy { .. }))
            {
                thread::sleep(Duration::from_millis(1));
            }
            first.release();
            assert_eq!(waiter.join().unwrap(), OperativeId(8));
        });

        let kinds: Vec<_> = sink.entries().iter().map(|e| e.event.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "StationAcquired",
                "StationBusy",
                "StationReleased",
                "StationAcquired",
                "StationReleased",
            ]
        );
        assert!(logs_contain("Station busy"));
    }
}
