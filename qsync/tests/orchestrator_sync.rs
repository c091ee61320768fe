//! Integration tests for multi-controller sync fan-out.

mod util;

use std::time::Duration;

use qsync::position::{FilterThresholds, PositionFix};
use qsync::session::{SessionConfig, Target};
use qsync::sync::{SyncOrchestrator, SyncOutcome};
use qsync::timezone::FixedZoneResolver;

use util::{Behavior, FakeController};

fn orchestrator(targets: Vec<Target>) -> SyncOrchestrator {
    SyncOrchestrator::new(
        targets,
        FilterThresholds::default(),
        SessionConfig::default(),
        Duration::from_secs(5),
        Box::new(FixedZoneResolver(chrono_tz::UTC)),
    )
}

#[tokio::test]
async fn test_syncs_all_controllers_and_moves_accepted_position() {
    let first = FakeController::spawn(Behavior::AckAll).await;
    let second = FakeController::spawn(Behavior::AckAll).await;

    let mut orch = orchestrator(vec![first.target(), second.target()]);
    let outcome = orch.handle_fix(PositionFix::new(42.5, -74.0)).await;

    assert_eq!(outcome, SyncOutcome::Synced);
    assert_eq!(orch.accepted().latitude, 42.5);
    assert_eq!(orch.accepted().longitude, -74.0);

    for controller in [&first, &second] {
        let commands = controller.recorded();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], "#SYSTEM,4,42.5,-74.0");
        assert_eq!(commands[1], "#SYSTEM,5,0");
        assert!(commands[2].starts_with("#SYSTEM,2,"));
        assert!(commands[3].starts_with("#SYSTEM,1,"));
    }
}

#[tokio::test]
async fn test_one_failed_controller_keeps_accepted_position() {
    let good = FakeController::spawn(Behavior::AckAll).await;

    // A listener that was closed before the test: connection refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);
    let dead = Target {
        name: "dead".to_string(),
        host: dead_addr.ip().to_string(),
        port: dead_addr.port(),
        username: "lutron".to_string(),
        password: "lutron".to_string(),
    };

    let mut orch = orchestrator(vec![good.target(), dead]);
    let before = *orch.accepted();

    let outcome = orch.handle_fix(PositionFix::new(42.5, -74.0)).await;

    assert_eq!(outcome, SyncOutcome::Failed);
    assert_eq!(orch.accepted().latitude, before.latitude);
    assert_eq!(orch.accepted().longitude, before.longitude);
    assert_eq!(orch.accepted().accepted_at, before.accepted_at);

    // The reachable controller still saw the whole batch.
    assert_eq!(good.recorded().len(), 4);
}
