//! Persistent session driver.
//!
//! Runs one [`SessionFsm`] against a real TCP connection as a long-lived
//! control channel: ad hoc commands go in through a [`SessionHandle`],
//! device responses and lifecycle changes come back as [`SessionEvent`]s.
//! The driver owns the heartbeat timer and the fixed-delay reconnect loop;
//! both are torn down on every exit path, and an explicit close suppresses
//! reconnection permanently.

use std::collections::VecDeque;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::config::{SessionConfig, Target};
use super::fsm::{Action, Input, SessionEvent, SessionFsm};

/// Read buffer size; controller responses are short lines.
const READ_BUFFER_SIZE: usize = 1024;

/// Commands accepted by the session task.
enum HandleCommand {
    Send(String),
    Close,
}

/// Caller-side handle to a running persistent session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<HandleCommand>,
}

impl SessionHandle {
    /// Send a raw command line to the controller.
    ///
    /// Delivery is serialized behind any in-flight command. Dropped with a
    /// log line if the session is currently disconnected.
    pub async fn send_raw(&self, command: impl Into<String>) {
        let _ = self.tx.send(HandleCommand::Send(command.into())).await;
    }

    /// Close the session for good: cancels the heartbeat and any pending
    /// reconnect, and suppresses future reconnection.
    pub async fn close(&self) {
        let _ = self.tx.send(HandleCommand::Close).await;
    }
}

/// Spawns persistent sessions.
pub struct SessionClient;

impl SessionClient {
    /// Spawn a persistent session task for `target`.
    ///
    /// The returned receiver yields lifecycle events and forwarded response
    /// lines; it is closed when the session ends for good.
    pub fn spawn(
        target: Target,
        config: SessionConfig,
    ) -> (SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(run_session(target, config, cmd_rx, event_tx));
        (SessionHandle { tx: cmd_tx }, event_rx)
    }
}

/// Connect/auth/serve loop with fixed-delay reconnection.
async fn run_session(
    target: Target,
    config: SessionConfig,
    mut cmd_rx: mpsc::Receiver<HandleCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
) {
    loop {
        let mut fsm = SessionFsm::persistent(&target, config.clone());
        let addr = target.addr();

        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                info!(target = %target.name, %addr, "Connected, authenticating");
                fsm.handle(Input::ConnectSucceeded);
                let (reader, writer) = stream.into_split();
                serve_connection(&mut fsm, reader, writer, &config, &mut cmd_rx, &event_tx).await;
                // Dropping the halves closes the transport; the heartbeat
                // interval lives inside serve_connection and is gone too.
            }
            Err(error) => {
                warn!(target = %target.name, %addr, %error, "Connection attempt failed");
                dispatch_notifications(fsm.handle(Input::ConnectFailed), &event_tx).await;
            }
        }

        if !fsm.should_reconnect() {
            break;
        }
        debug!(target = %target.name, delay = ?config.reconnect_delay, "Reconnecting after delay");
        if !wait_for_reconnect(&config, &mut cmd_rx).await {
            break;
        }
    }
    debug!(target = %target.name, "Session task finished");
}

/// Sleep out the reconnect delay, still honoring an explicit close.
/// Returns false when the session should not reconnect after all.
async fn wait_for_reconnect(
    config: &SessionConfig,
    cmd_rx: &mut mpsc::Receiver<HandleCommand>,
) -> bool {
    let delay = tokio::time::sleep(config.reconnect_delay);
    tokio::pin!(delay);
    loop {
        tokio::select! {
            _ = &mut delay => return true,
            cmd = cmd_rx.recv() => match cmd {
                Some(HandleCommand::Send(command)) => {
                    debug!(%command, "Dropping command, session not connected");
                }
                Some(HandleCommand::Close) | None => return false,
            }
        }
    }
}

enum ConnectionFlow {
    Continue,
    Terminated,
}

/// Pump one live connection until it terminates.
async fn serve_connection(
    fsm: &mut SessionFsm,
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    config: &SessionConfig,
    cmd_rx: &mut mpsc::Receiver<HandleCommand>,
    event_tx: &mpsc::Sender<SessionEvent>,
) {
    let mut heartbeat: Option<Interval> = None;
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        let actions = tokio::select! {
            read = reader.read(&mut buf) => match read {
                Ok(0) => fsm.handle(Input::TransportClosed),
                Ok(n) => fsm.handle(Input::Bytes(buf[..n].to_vec())),
                Err(error) => {
                    warn!(%error, "Transport error");
                    fsm.handle(Input::TransportClosed)
                }
            },
            cmd = cmd_rx.recv() => match cmd {
                Some(HandleCommand::Send(command)) => fsm.handle(Input::SendRequested(command)),
                Some(HandleCommand::Close) | None => fsm.handle(Input::CloseRequested),
            },
            _ = tick(heartbeat.as_mut()) => fsm.handle(Input::HeartbeatTick),
        };

        match apply_actions(fsm, actions, &mut writer, &mut heartbeat, config, event_tx).await {
            ConnectionFlow::Continue => {}
            ConnectionFlow::Terminated => return,
        }
    }
}

/// Awaits the heartbeat timer, or forever if it is not armed yet.
async fn tick(heartbeat: Option<&mut Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Carry out the FSM's effects in order. A `Disconnect` (or a failed write)
/// feeds `TransportClosed` back through the FSM so the closing
/// notifications are appended to the same pass.
async fn apply_actions(
    fsm: &mut SessionFsm,
    actions: Vec<Action>,
    writer: &mut OwnedWriteHalf,
    heartbeat: &mut Option<Interval>,
    config: &SessionConfig,
    event_tx: &mpsc::Sender<SessionEvent>,
) -> ConnectionFlow {
    let mut queue: VecDeque<Action> = actions.into();
    let mut flow = ConnectionFlow::Continue;

    while let Some(action) = queue.pop_front() {
        match action {
            Action::Transmit(line) => {
                let framed = format!("{line}\r\n");
                if let Err(error) = writer.write_all(framed.as_bytes()).await {
                    warn!(%error, "Write failed");
                    queue.extend(fsm.handle(Input::TransportClosed));
                }
            }
            Action::Notify(event) => {
                if event == SessionEvent::Disconnected {
                    flow = ConnectionFlow::Terminated;
                }
                dispatch_notifications(vec![Action::Notify(event)], event_tx).await;
            }
            Action::StartHeartbeat => {
                let mut interval = interval_at(
                    Instant::now() + config.heartbeat_interval,
                    config.heartbeat_interval,
                );
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                *heartbeat = Some(interval);
            }
            Action::Disconnect => {
                queue.extend(fsm.handle(Input::TransportClosed));
            }
            // Persistent sessions carry no one-shot batch.
            Action::CompleteBatch(_) => {}
        }
    }

    flow
}

/// Forward `Notify` actions to the event channel; other actions are
/// ignored. A gone receiver is fine: the session keeps running for its
/// side effects.
async fn dispatch_notifications(actions: Vec<Action>, event_tx: &mpsc::Sender<SessionEvent>) {
    for action in actions {
        if let Action::Notify(event) = action {
            let _ = event_tx.send(event).await;
        }
    }
}
