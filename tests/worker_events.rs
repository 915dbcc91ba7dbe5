use assert_fs::prelude::*;
use safe_sort::{CancellationToken, Orchestrator, Phase, RunEvent, RunStatus, spawn_run};

#[test]
fn events_arrive_in_pipeline_order_and_end_with_result() {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("src/a.jpg").write_str("a").unwrap();
    td.child("src/b.txt").write_str("b").unwrap();

    let handle = spawn_run(
        Orchestrator::new(td.path().join("backups")),
        td.path().join("src"),
        CancellationToken::new(),
    );
    let events: Vec<RunEvent> = handle.events().iter().collect();
    let result = handle.join();

    assert_eq!(result.status, RunStatus::Success);
    let phases: Vec<Phase> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Progress(p) => Some(p.phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            Phase::Backup,
            Phase::Backup,
            Phase::Staging,
            Phase::Staging,
            Phase::ApplyStart
        ]
    );
    match events.last() {
        Some(RunEvent::Finished(r)) => assert_eq!(r, &result),
        other => panic!("expected Finished last, got {other:?}"),
    }
}

#[test]
fn cancel_from_requester_thread() {
    let td = assert_fs::TempDir::new().unwrap();
    for i in 0..50 {
        td.child(format!("src/f{i}.txt")).write_str("x").unwrap();
    }
    let handle = spawn_run(
        Orchestrator::new(td.path().join("backups")),
        td.path().join("src"),
        CancellationToken::new(),
    );

    for event in handle.events().iter() {
        if let RunEvent::Progress(p) = event {
            if p.phase == Phase::Staging {
                handle.cancel();
            }
        }
    }
    let result = handle.join();
    // The worker may get past the last checkpoint before noticing.
    assert!(matches!(
        result.status,
        RunStatus::Cancelled | RunStatus::Success
    ));
    if result.status == RunStatus::Cancelled {
        assert!(td.path().join("src/f0.txt").is_file());
        assert!(!td.path().join("backups/src_staging").exists());
    }
}
