//! Parsing of the four-integer input file.

use shadows_simulation::SimulationConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Field names, in file order.
const FIELDS: [&str; 4] = ["operative count", "group size", "station hold", "ledger hold"];

/// Problems reading or parsing the input file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file ended before all four values.
    #[error("missing {0}")]
    MissingValue(&'static str),

    /// A token is not a non-negative integer.
    #[error("{field} must be a non-negative integer, got {value:?}")]
    InvalidValue {
        /// Field being parsed.
        field: &'static str,
        /// Offending token.
        value: String,
    },

    /// Extra tokens after the fourth value.
    #[error("unexpected trailing input {0:?}")]
    TrailingInput(String),
}

/// The four values of an input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationInput {
    /// Operatives (N).
    pub operatives: u32,
    /// Operatives per unit (M).
    pub group_size: u32,
    /// Station hold in milliseconds (x).
    pub station_hold_ms: u64,
    /// Ledger hold in milliseconds (y).
    pub ledger_hold_ms: u64,
}

impl SimulationInput {
    /// Configuration with these values and defaults for everything else.
    pub fn to_config(&self) -> SimulationConfig {
        SimulationConfig::new(self.operatives, self.group_size)
            .with_station_hold(Duration::from_millis(self.station_hold_ms))
            .with_ledger_hold(Duration::from_millis(self.ledger_hold_ms))
    }
}

/// Parse the text of an input file.
pub fn parse_input(text: &str) -> Result<SimulationInput, InputError> {
    let mut tokens = text.split_whitespace();
    let mut values = [0u64; 4];
    for (slot, field) in values.iter_mut().zip(FIELDS) {
        let token = tokens.next().ok_or(InputError::MissingValue(field))?;
        *slot = token.parse().map_err(|_| InputError::InvalidValue {
            field,
            value: token.to_string(),
        })?;
    }
    if let Some(extra) = tokens.next() {
        return Err(InputError::TrailingInput(extra.to_string()));
    }

    let narrow = |index: usize| {
        u32::try_from(values[index]).map_err(|_| InputError::InvalidValue {
            field: FIELDS[index],
            value: values[index].to_string(),
        })
    };
    Ok(SimulationInput {
        operatives: narrow(0)?,
        group_size: narrow(1)?,
        station_hold_ms: values[2],
        ledger_hold_ms: values[3],
    })
}

/// Read and parse an input file.
pub fn read_input(path: &Path) -> Result<SimulationInput, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_input(&text)
}
