//! Configuration types for a simulation run.

use crate::{ConfigError, DelayConfig};
use shadows_types::{Roster, DEFAULT_STATIONS};
use std::time::Duration;

/// Station hold time when none is given.
pub const DEFAULT_STATION_HOLD: Duration = Duration::from_millis(10);

/// Ledger hold time when none is given.
pub const DEFAULT_LEDGER_HOLD: Duration = Duration::from_millis(3);

/// Number of intelligence staff when none is given.
pub const DEFAULT_STAFF: u32 = 2;

/// Configuration for a simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of operatives (N).
    pub operatives: u32,

    /// Operatives per unit (M). Must divide `operatives`.
    pub group_size: u32,

    /// How long an operative keeps its station (x).
    pub station_hold: Duration,

    /// How long a leader keeps the ledger (y).
    pub ledger_hold: Duration,

    /// Number of typewriting stations.
    pub stations: u32,

    /// Number of intelligence staff reading the ledger.
    pub staff: u32,

    /// Arrival and staff idle delays.
    pub delays: DelayConfig,
}

impl SimulationConfig {
    /// Create a new configuration with default timings.
    pub fn new(operatives: u32, group_size: u32) -> Self {
        Self {
            operatives,
            group_size,
            station_hold: DEFAULT_STATION_HOLD,
            ledger_hold: DEFAULT_LEDGER_HOLD,
            stations: DEFAULT_STATIONS,
            staff: DEFAULT_STAFF,
            delays: DelayConfig::default(),
        }
    }

    /// Set the station hold time.
    pub fn with_station_hold(mut self, hold: Duration) -> Self {
        self.station_hold = hold;
        self
    }

    /// Set the ledger hold time.
    pub fn with_ledger_hold(mut self, hold: Duration) -> Self {
        self.ledger_hold = hold;
        self
    }

    /// Set the number of stations.
    pub fn with_stations(mut self, stations: u32) -> Self {
        self.stations = stations;
        self
    }

    /// Set the number of staff.
    pub fn with_staff(mut self, staff: u32) -> Self {
        self.staff = staff;
        self
    }

    /// Set the delay model.
    pub fn with_delays(mut self, delays: DelayConfig) -> Self {
        self.delays = delays;
        self
    }

    /// Set the random seed (jitter delays only).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.delays = self.delays.with_seed(seed);
        self
    }

    /// Check the configuration and derive the roster.
    pub fn validate(&self) -> Result<Roster, ConfigError> {
        let roster = Roster::new(self.operatives, self.group_size, self.stations)?;
        if self.staff == 0 {
            return Err(ConfigError::ZeroStaff);
        }
        if self.station_hold.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "station hold",
            });
        }
        if self.ledger_hold.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "ledger hold",
            });
        }
        Ok(roster)
    }

    /// Number of units, assuming the configuration is valid.
    pub fn units(&self) -> u32 {
        self.operatives.checked_div(self.group_size).unwrap_or(0)
    }

    /// Jitter spread (in steps) for operative arrival delays.
    pub(crate) fn arrival_spread(&self) -> u32 {
        millis_u32(self.station_hold)
    }

    /// Jitter spread (in steps) for staff idle delays.
    pub(crate) fn staff_spread(&self) -> u32 {
        millis_u32(self.ledger_hold)
    }
}

fn millis_u32(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
