//! Integration tests for one-shot batch delivery over real TCP.

mod util;

use std::time::Duration;

use qsync::session::{deliver, SessionConfig, Target};
use qsync::sync::CommandBatch;

use util::{Behavior, FakeController};

fn batch() -> CommandBatch {
    CommandBatch::new(vec![
        "#SYSTEM,4,42.5,-74.0".to_string(),
        "#SYSTEM,5,-5".to_string(),
        "#SYSTEM,2,06/15/2025".to_string(),
    ])
}

#[tokio::test]
async fn test_delivers_full_batch_in_order() {
    let controller = FakeController::spawn(Behavior::AckAll).await;

    let result = deliver(
        &controller.target(),
        &batch(),
        Duration::from_secs(5),
        &SessionConfig::default(),
    )
    .await;

    assert!(result.success);
    assert_eq!(result.target, "fake");
    assert_eq!(
        controller.recorded(),
        vec![
            "#SYSTEM,4,42.5,-74.0".to_string(),
            "#SYSTEM,5,-5".to_string(),
            "#SYSTEM,2,06/15/2025".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_deadline_fires_when_acks_stop() {
    // Acks stop after the second command; the third waits forever.
    let controller = FakeController::spawn(Behavior::AckFirst(2)).await;

    let result = deliver(
        &controller.target(),
        &batch(),
        Duration::from_millis(500),
        &SessionConfig::default(),
    )
    .await;

    assert!(!result.success);
    // The third command was transmitted before the stall.
    assert_eq!(controller.recorded().len(), 3);
}

#[tokio::test]
async fn test_connection_refused_fails() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let target = Target {
        name: "nobody".to_string(),
        host: addr.ip().to_string(),
        port: addr.port(),
        username: "lutron".to_string(),
        password: "lutron".to_string(),
    };

    let result = deliver(
        &target,
        &batch(),
        Duration::from_secs(2),
        &SessionConfig::default(),
    )
    .await;

    assert!(!result.success);
}

#[tokio::test]
async fn test_rejected_login_fails_without_sending_commands() {
    let controller = FakeController::spawn(Behavior::RejectLogin).await;

    let result = deliver(
        &controller.target(),
        &batch(),
        Duration::from_secs(2),
        &SessionConfig::default(),
    )
    .await;

    assert!(!result.success);
    assert!(controller.recorded().is_empty());
}
