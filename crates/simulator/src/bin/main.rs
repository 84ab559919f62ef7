//! Operative simulation CLI
//!
//! Reads `N M x y` from an input file, runs the simulation, and writes the
//! event log to a file or stdout. Diagnostics go to stderr via tracing.

use anyhow::{bail, Context};
use clap::Parser;
use shadows_core::{EventSink, MemorySink, Tee, WriterSink};
use shadows_simulation::{audit, DelayConfig, SimulationRunner, DEFAULT_SEED, DEFAULT_STAFF};
use shadows_simulator::read_input;
use shadows_types::DEFAULT_STATIONS;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shadows-sim")]
#[command(about = "Simulate operatives contending for stations, unit barriers and a shared logbook")]
#[command(version)]
struct Cli {
    /// Input file with `N M x y`
    input: PathBuf,

    /// Where to write the event log (stdout if omitted)
    output: Option<PathBuf>,

    /// Number of typewriting stations
    #[arg(long, default_value_t = DEFAULT_STATIONS)]
    stations: u32,

    /// Number of intelligence staff
    #[arg(long, default_value_t = DEFAULT_STAFF)]
    staff: u32,

    /// Seed for arrival and staff delays
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Length of one delay step in milliseconds
    #[arg(long, default_value = "5")]
    jitter_unit_ms: u64,

    /// Disable arrival and staff delays entirely
    #[arg(long)]
    no_jitter: bool,

    /// Replay the event log after the run and fail on any violation
    #[arg(long)]
    audit: bool,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let input = read_input(&cli.input)?;
    let delays = if cli.no_jitter {
        DelayConfig::none()
    } else {
        DelayConfig::Jitter {
            unit: Duration::from_millis(cli.jitter_unit_ms),
            seed: cli.seed,
        }
    };
    let config = input
        .to_config()
        .with_stations(cli.stations)
        .with_staff(cli.staff)
        .with_delays(delays);

    let writer: Box<dyn Write + Send> = match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };

    let capture = MemorySink::new();
    let sink: Box<dyn EventSink> = if cli.audit {
        Box::new(Tee::new(WriterSink::new(writer), capture.clone()))
    } else {
        Box::new(WriterSink::new(writer))
    };

    let runner = SimulationRunner::new(config, sink)?;
    let roster = *runner.roster();
    let report = runner.run()?;
    info!(
        completed = report.completed_units,
        expected = report.expected_units,
        events = report.events,
        staff_reads = report.staff_reads,
        "Run complete"
    );

    if cli.audit {
        let audit = audit(&capture.entries(), &roster);
        if !audit.is_clean() {
            for violation in &audit.violations {
                error!(%violation, "Audit violation");
            }
            bail!("audit found {} violation(s)", audit.violations.len());
        }
        info!(
            reads = audit.reads,
            max_concurrent_readers = audit.max_concurrent_readers,
            station_waits = audit.station_waits,
            "Audit clean"
        );
    }

    Ok(())
}
