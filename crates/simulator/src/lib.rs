//! Operative Simulator
//!
//! Command-line front end for `shadows-simulation`. It reads the run
//! shape from an input file, picks where the event log goes, and runs
//! the simulation.
//!
//! # Input
//!
//! Four non-negative integers separated by any whitespace, conventionally
//! laid out as:
//!
//! ```text
//! N M
//! x y
//! ```
//!
//! - `N`: operatives, `M`: operatives per unit (must divide `N`)
//! - `x`: station hold in milliseconds, `y`: ledger hold in milliseconds
//!
//! # Example
//!
//! ```ignore
//! use shadows_simulator::parse_input;
//!
//! let input = parse_input("15 5\n10 3\n")?;
//! let config = input.to_config();
//! assert_eq!(config.units(), 3);
//! ```

pub mod input;

pub use input::{parse_input, read_input, InputError, SimulationInput};
