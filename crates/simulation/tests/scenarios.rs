//! End-to-end runs checked against the recorded event log.

use shadows_core::{Event, MemorySink, Stamped, Tee, WriterSink};
use shadows_simulation::{audit, DelayConfig, RunError, RunReport, SimulationConfig, SimulationRunner};
use shadows_types::UnitId;
use std::collections::BTreeSet;
use std::time::Duration;

fn run_and_audit(config: SimulationConfig) -> (RunReport, Vec<Stamped>) {
    let sink = MemorySink::new();
    let runner = SimulationRunner::new(config, sink.clone()).unwrap();
    let roster = *runner.roster();
    let report = runner.run().unwrap();

    let entries = sink.entries();
    let audit = audit(&entries, &roster);
    assert!(audit.is_clean(), "violations: {:#?}", audit.violations);
    assert_eq!(audit.completed, report.completed_units);
    (report, entries)
}

#[test]
fn test_four_operatives_in_pairs() {
    let config = SimulationConfig::new(4, 2)
        .with_station_hold(Duration::from_millis(10))
        .with_ledger_hold(Duration::from_millis(5))
        .with_delays(DelayConfig::Jitter {
            unit: Duration::from_millis(1),
            seed: 1,
        });
    let (report, entries) = run_and_audit(config);

    assert_eq!(report.expected_units, 2);
    assert_eq!(report.completed_units, 2);
    assert_eq!(report.events as usize, entries.len());
}

#[test]
fn test_three_units_all_distribute() {
    let config = SimulationConfig::new(15, 5)
        .with_station_hold(Duration::from_millis(3))
        .with_ledger_hold(Duration::from_millis(2))
        .with_delays(DelayConfig::Jitter {
            unit: Duration::from_millis(1),
            seed: 42,
        });
    let (report, entries) = run_and_audit(config);
    assert_eq!(report.completed_units, 3);

    let distributed: BTreeSet<UnitId> = entries
        .iter()
        .filter_map(|e| match e.event {
            Event::WriteEnded { unit, .. } => Some(unit),
            _ => None,
        })
        .collect();
    assert_eq!(distributed, (0..3).map(UnitId).collect());

    // Every staff member went off duty exactly once, after the last write.
    let last_write = entries
        .iter()
        .rposition(|e| matches!(e.event, Event::WriteEnded { .. }))
        .unwrap();
    let stops: Vec<_> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e.event, Event::StaffStopped { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(stops.len(), 2);
    assert!(stops.iter().all(|&i| i > last_write));
}

#[test]
fn test_zero_delays_give_same_outcome_every_time() {
    for _ in 0..3 {
        let config = SimulationConfig::new(4, 2)
            .with_station_hold(Duration::from_millis(10))
            .with_ledger_hold(Duration::from_millis(5))
            .with_delays(DelayConfig::none());
        let (report, _) = run_and_audit(config);
        assert_eq!(report.completed_units, 2);
    }
}

#[test]
fn test_single_station_serializes_everyone() {
    let config = SimulationConfig::new(6, 3)
        .with_stations(1)
        .with_station_hold(Duration::from_millis(1))
        .with_ledger_hold(Duration::from_millis(1))
        .with_delays(DelayConfig::none());
    let (report, entries) = run_and_audit(config);
    assert_eq!(report.completed_units, 2);

    let acquisitions = entries
        .iter()
        .filter(|e| matches!(e.event, Event::StationAcquired { .. }))
        .count();
    assert_eq!(acquisitions, 6);
}

#[test]
fn test_writers_progress_under_read_pressure() {
    // Many staff reading back to back must not starve the leaders.
    let config = SimulationConfig::new(8, 2)
        .with_staff(8)
        .with_station_hold(Duration::from_millis(2))
        .with_ledger_hold(Duration::from_millis(2))
        .with_delays(DelayConfig::none());
    let (report, _) = run_and_audit(config);
    assert_eq!(report.completed_units, 4);
    assert!(report.staff_reads > 0);
}

#[test]
fn test_invalid_shape_is_rejected_before_running() {
    let sink = MemorySink::new();
    let result = SimulationRunner::new(SimulationConfig::new(7, 2), sink.clone());
    assert!(result.is_err());
    assert!(sink.is_empty());

    let err: RunError = result.unwrap_err().into();
    assert!(err.to_string().contains("invalid configuration"));
}

#[test]
fn test_text_output_and_capture_agree() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let capture = MemorySink::new();
    let sink = Tee::new(WriterSink::new(file.reopen().unwrap()), capture.clone());
    let config = SimulationConfig::new(2, 2)
        .with_station_hold(Duration::from_millis(1))
        .with_ledger_hold(Duration::from_millis(1))
        .with_delays(DelayConfig::Fixed(Duration::from_millis(1)));
    let report = SimulationRunner::new(config, sink).unwrap().run().unwrap();

    let output = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(output.lines().count(), capture.len());
    assert_eq!(report.events as usize, capture.len());
    assert!(output.contains("Unit 1 has completed intelligence distribution"));
}
