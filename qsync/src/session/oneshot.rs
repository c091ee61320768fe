//! One-shot batch delivery.
//!
//! Opens a session, authenticates, drains one command batch under a single
//! wall-clock deadline, and reports success or failure for the target. The
//! deadline is the sole upper bound on the attempt: it covers connecting,
//! authenticating, and every acknowledgement wait. There is no retry here;
//! the caller re-attempts on the next qualifying position fix.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::config::{SessionConfig, Target};
use super::error::SessionError;
use super::fsm::{Action, Input, SessionEvent, SessionFsm};
use crate::sync::CommandBatch;

/// Outcome of one delivery attempt against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Name of the target this result belongs to.
    pub target: String,
    /// Whether the whole batch was delivered and acknowledged.
    pub success: bool,
}

/// Deliver `batch` to `target`, resolving within `deadline`.
///
/// Failures are absorbed and logged; only the boolean outcome propagates.
pub async fn deliver(
    target: &Target,
    batch: &CommandBatch,
    deadline: Duration,
    config: &SessionConfig,
) -> SyncResult {
    let success = match timeout(deadline, drain_batch(target, batch, config)).await {
        Ok(Ok(drained)) => drained,
        Ok(Err(error)) => {
            warn!(target = %target.name, %error, "Batch delivery failed");
            false
        }
        Err(_elapsed) => {
            let error = SessionError::DeadlineExceeded(deadline);
            warn!(target = %target.name, %error, "Batch delivery failed");
            false
        }
    };

    SyncResult {
        target: target.name.clone(),
        success,
    }
}

/// Connect, authenticate, and pump the session until the batch resolves.
///
/// Dropping this future (when the deadline fires) force-closes the
/// connection; any in-flight acknowledgement is discarded, not awaited.
async fn drain_batch(
    target: &Target,
    batch: &CommandBatch,
    config: &SessionConfig,
) -> Result<bool, SessionError> {
    let addr = target.addr();
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| SessionError::Connection {
            addr: addr.clone(),
            source,
        })?;
    let (mut reader, mut writer) = stream.into_split();

    let mut fsm = SessionFsm::one_shot(
        target,
        config.clone(),
        batch.commands().iter().cloned(),
    );
    let mut actions = fsm.handle(Input::ConnectSucceeded);
    let mut buf = [0u8; 1024];

    loop {
        if let Some(outcome) = apply_actions(target, actions, &mut writer).await? {
            return Ok(outcome);
        }

        let n = reader.read(&mut buf).await?;
        actions = if n == 0 {
            fsm.handle(Input::TransportClosed)
        } else {
            fsm.handle(Input::Bytes(buf[..n].to_vec()))
        };
    }
}

/// Execute the FSM's effects; returns the batch outcome once decided.
async fn apply_actions(
    target: &Target,
    actions: Vec<Action>,
    writer: &mut OwnedWriteHalf,
) -> Result<Option<bool>, SessionError> {
    let mut outcome = None;
    for action in actions {
        match action {
            Action::Transmit(line) => {
                debug!(target = %target.name, command = %line, "Sending");
                let framed = format!("{line}\r\n");
                writer.write_all(framed.as_bytes()).await?;
            }
            Action::Notify(SessionEvent::LoginFailed) => {
                return Err(SessionError::AuthenticationFailed {
                    addr: target.addr(),
                });
            }
            Action::Notify(SessionEvent::Response(line)) => {
                debug!(target = %target.name, %line, "Acknowledged");
            }
            Action::Notify(_) => {}
            Action::CompleteBatch(success) => outcome = Some(success),
            // The connection is dropped when this function's caller
            // returns; nothing to do eagerly.
            Action::Disconnect => {}
            // One-shot sessions have no heartbeat.
            Action::StartHeartbeat => {}
        }
    }
    Ok(outcome)
}
