//! Cooperative shutdown for looping tasks.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// One-way "stop" flag that looping tasks check between cycles.
///
/// Raising it never interrupts work in progress; a task sees it the next
/// time it calls [`is_stopped`](Self::is_stopped) or
/// [`sleep`](Self::sleep). Sleeping tasks are woken early so shutdown does
/// not wait out a long idle interval.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: Mutex<bool>,
    raised: Condvar,
}

impl StopSignal {
    /// Create a lowered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake every sleeper.
    pub fn stop(&self) {
        let mut stopped = self.stopped.lock();
        *stopped = true;
        self.raised.notify_all();
    }

    /// Whether the signal has been raised.
    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    /// Sleep for `duration` unless the signal is raised first.
    ///
    /// Returns `true` if the signal is raised when the sleep ends.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut stopped = self.stopped.lock();
        while !*stopped {
            if self.raised.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        *stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sleep_runs_to_deadline_when_not_stopped() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(!signal.sleep(Duration::from_millis(10)));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_stop_wakes_sleeper_early() {
        let signal = StopSignal::new();
        thread::scope(|s| {
            let sleeper = s.spawn(|| {
                let start = Instant::now();
                (signal.sleep(Duration::from_secs(30)), start.elapsed())
            });
            thread::sleep(Duration::from_millis(5));
            signal.stop();
            let (stopped, slept) = sleeper.join().unwrap();
            assert!(stopped);
            assert!(slept < Duration::from_secs(30));
        });
        assert!(signal.is_stopped());
    }

    #[test]
    fn test_sleep_after_stop_returns_immediately() {
        let signal = StopSignal::new();
        signal.stop();
        assert!(signal.sleep(Duration::from_secs(30)));
    }
}
