use std::fs::{remove_file, write};

use memfit_model::{PolicyKind, SimConfig, loader::load_processes, run_with_policy};

#[test]
fn file_input_runs_end_to_end() {
    let path = std::env::temp_dir().join("memfit_loader_e2e.txt");
    write(&path, "P1 0 40 3\nP2 0 60 2\nP3 2 30 1\n").unwrap();

    let processes = load_processes(&path).unwrap();
    assert_eq!(processes.len(), 3);

    let config = SimConfig::new(100, "first-fit").unwrap();
    let mut lines = Vec::new();
    let summary = run_with_policy(config.policy, processes, config.total_memory, |report| {
        lines.push(report.segments.len());
    });

    // P3 waits on a full memory until P2 frees its 60 after tick 2
    assert_eq!(summary.deferred_allocations, 1);
    assert_eq!(summary.successful_allocations, 3);
    assert_eq!(summary.processes_completed, 3);
    assert_eq!(lines.len() as u64, summary.simulation_time);
    assert_eq!(config.policy, PolicyKind::FirstFit);

    remove_file(&path).unwrap();
}
