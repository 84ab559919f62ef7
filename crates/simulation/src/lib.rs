//! Simulation runner.
//!
//! Spawns one thread per operative and per staff member, wires them to
//! the station pool, the unit barriers and the ledger, and waits for the
//! run to finish.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │   operative 1..N                     staff 1..S         │
//! │   ─────────────                      ──────────         │
//! │   arrival delay                      loop until stop:   │
//! │   StationPool::acquire                 idle delay       │
//! │   hold x                               Ledger::read     │
//! │   release                              release          │
//! │   member → GroupBarrier::member_arrived                 │
//! │   leader → GroupBarrier::leader_wait                    │
//! │            Ledger::write, hold y, finish                │
//! │                                                         │
//! │   join operatives → StopSignal::stop → join staff       │
//! └────────────────────────────┬────────────────────────────┘
//!                              ▼
//!                   EventLog → EventSink
//! ```
//!
//! Given a recorded log, [`audit`] replays it and reports any broken
//! invariant.

pub mod audit;
mod config;
mod delay;
mod error;
mod runner;
mod tasks;

pub use audit::{audit, AuditReport, Violation};
pub use config::{SimulationConfig, DEFAULT_LEDGER_HOLD, DEFAULT_STAFF, DEFAULT_STATION_HOLD};
pub use delay::{DelayConfig, DelaySource, DEFAULT_JITTER_UNIT, DEFAULT_SEED};
pub use error::{ConfigError, RunError};
pub use runner::{RunReport, SimulationRunner};
