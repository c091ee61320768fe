//! Integration tests for the persistent session driver over real TCP.

mod util;

use std::time::Duration;

use qsync::session::{SessionClient, SessionConfig, SessionEvent};

use util::{expect_event, Behavior, FakeController};

fn quick_config() -> SessionConfig {
    SessionConfig {
        heartbeat_interval: Duration::from_millis(100),
        reconnect_delay: Duration::from_millis(100),
        ..SessionConfig::default()
    }
}

/// Long timers so neither heartbeat nor reconnect interferes.
fn quiet_config() -> SessionConfig {
    SessionConfig {
        heartbeat_interval: Duration::from_secs(60),
        reconnect_delay: Duration::from_secs(60),
        ..SessionConfig::default()
    }
}

#[tokio::test]
async fn test_connect_send_response_close() {
    let controller = FakeController::spawn(Behavior::AckAll).await;
    let (handle, mut events) = SessionClient::spawn(controller.target(), quiet_config());

    assert_eq!(expect_event(&mut events).await, SessionEvent::Connected);

    handle.send_raw("?SYSTEM,1").await;
    assert_eq!(
        expect_event(&mut events).await,
        SessionEvent::Response("~?SYSTEM,1".to_string())
    );
    assert_eq!(controller.recorded(), vec!["?SYSTEM,1".to_string()]);

    handle.close().await;
    assert_eq!(expect_event(&mut events).await, SessionEvent::Disconnected);

    // Channel closes once the task is done; no reconnection follows.
    let end = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for channel close");
    assert_eq!(end, None);
}

#[tokio::test]
async fn test_heartbeat_probe_keeps_session_alive() {
    let controller = FakeController::spawn(Behavior::AckAll).await;
    let (handle, mut events) = SessionClient::spawn(controller.target(), quick_config());

    assert_eq!(expect_event(&mut events).await, SessionEvent::Connected);

    // Several heartbeat intervals pass; probes are acked, nothing drops.
    tokio::time::sleep(Duration::from_millis(450)).await;

    let mut saw_probe_ack = false;
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(50), events.recv()).await
    {
        match event {
            SessionEvent::Response(line) if line.contains("gettime") => saw_probe_ack = true,
            SessionEvent::Disconnected => panic!("session dropped despite acked probes"),
            _ => {}
        }
    }
    assert!(saw_probe_ack);
    assert!(controller.recorded().contains(&"gettime".to_string()));

    handle.close().await;
}

#[tokio::test]
async fn test_silent_controller_triggers_reconnect() {
    let controller = FakeController::spawn(Behavior::SilentAfterLogin).await;
    let (handle, mut events) = SessionClient::spawn(controller.target(), quick_config());

    // First connection authenticates, then the unanswered probe kills it.
    assert_eq!(expect_event(&mut events).await, SessionEvent::Connected);
    assert_eq!(expect_event(&mut events).await, SessionEvent::Disconnected);

    // The listener is still up, so the session heals itself.
    assert_eq!(expect_event(&mut events).await, SessionEvent::Connected);

    handle.close().await;
}
