//! The session state machine.
//!
//! One [`SessionFsm`] owns the protocol logic for one connection to one
//! controller: prompt-driven authentication, strictly serialized command
//! delivery (one in flight, next sent only after an acknowledgement), and
//! liveness accounting. It is pure with respect to I/O: callers feed typed
//! [`Input`]s and execute the returned [`Action`]s, which makes every
//! transition sequence unit-testable without sockets or timers.
//!
//! Two drivers sit on top of it: [`super::client`] runs a persistent
//! self-healing session, and [`super::oneshot`] drains a single command
//! batch under a deadline.

use std::collections::VecDeque;

use tracing::debug;

use super::config::{SessionConfig, Target};
use super::wire::PromptBuffer;

/// Sub-steps of the prompt-matching authentication exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    /// Waiting for the login prompt literal.
    Login,
    /// Username sent; waiting for the password prompt literal.
    Password,
    /// Password sent; waiting for the shell prompt (or a re-issued login
    /// prompt, which means the credentials were rejected).
    Confirm,
}

/// Lifecycle states of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticating(AuthStage),
    /// Authenticated and idle.
    Ready,
    /// A command is in flight; awaiting its acknowledgement.
    Busy,
    /// Termination in progress; the driver is dropping the transport.
    Closing,
}

/// Whether this session lives forever or drains one batch and closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Persistent,
    OneShot,
}

/// Typed transition inputs fed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// The TCP connection was established.
    ConnectSucceeded,
    /// The TCP connection attempt failed.
    ConnectFailed,
    /// Raw bytes arrived on the transport.
    Bytes(Vec<u8>),
    /// The recurring liveness timer fired.
    HeartbeatTick,
    /// An external caller asked to send an ad hoc command.
    SendRequested(String),
    /// An external caller asked to close the session for good.
    CloseRequested,
    /// The transport is gone (EOF, I/O error, or dropped by us).
    TransportClosed,
}

/// Session lifecycle events surfaced to the owning caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Authentication completed; the shell prompt was seen.
    Connected,
    /// The controller rejected the credentials.
    LoginFailed,
    /// The session ended (intentionally or not).
    Disconnected,
    /// One forwarded acknowledgement/response line.
    Response(String),
}

/// Effects the driver must carry out, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write this line to the transport (driver appends CRLF).
    Transmit(String),
    /// Surface a lifecycle event.
    Notify(SessionEvent),
    /// Arm the recurring heartbeat timer (persistent mode, once per
    /// connection, on first entering `Ready`).
    StartHeartbeat,
    /// Drop the transport, then feed back `Input::TransportClosed`.
    Disconnect,
    /// One-shot mode: the batch outcome is decided.
    CompleteBatch(bool),
}

/// Pure state machine for one connection to one controller.
pub struct SessionFsm {
    mode: Mode,
    state: SessionState,
    config: SessionConfig,
    username: String,
    password: String,
    buffer: PromptBuffer,
    /// Commands awaiting delivery; the front entry is the one in flight.
    /// A command is popped only once its acknowledgement is observed.
    pending: VecDeque<String>,
    /// Traffic seen since the last heartbeat tick.
    alive: bool,
    /// Set by an explicit close (or login rejection); suppresses
    /// reconnection permanently for this instance.
    intentional_close: bool,
    /// One-shot mode: completion already signaled.
    batch_done: bool,
}

impl SessionFsm {
    /// State machine for a long-lived control channel.
    pub fn persistent(target: &Target, config: SessionConfig) -> Self {
        Self::new(Mode::Persistent, target, config, VecDeque::new())
    }

    /// State machine preloaded with a command batch to drain once.
    pub fn one_shot(
        target: &Target,
        config: SessionConfig,
        commands: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::new(Mode::OneShot, target, config, commands.into_iter().collect())
    }

    fn new(mode: Mode, target: &Target, config: SessionConfig, pending: VecDeque<String>) -> Self {
        Self {
            mode,
            state: SessionState::Connecting,
            config,
            username: target.username.clone(),
            password: target.password.clone(),
            buffer: PromptBuffer::new(),
            pending,
            alive: false,
            intentional_close: false,
            batch_done: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the driver should schedule a reconnection attempt after the
    /// session ends. Never true after an explicit close or a rejected login.
    pub fn should_reconnect(&self) -> bool {
        self.mode == Mode::Persistent && !self.intentional_close
    }

    /// Number of commands not yet acknowledged.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feed one input; returns the effects to carry out, in order.
    pub fn handle(&mut self, input: Input) -> Vec<Action> {
        let mut actions = Vec::new();
        match input {
            Input::ConnectSucceeded => {
                if self.state == SessionState::Connecting {
                    self.buffer.clear();
                    self.state = SessionState::Authenticating(AuthStage::Login);
                }
            }
            Input::ConnectFailed => {
                self.state = SessionState::Disconnected;
                actions.push(Action::Notify(SessionEvent::Disconnected));
                self.complete_if_oneshot(false, &mut actions);
            }
            Input::Bytes(data) => self.on_bytes(&data, &mut actions),
            Input::HeartbeatTick => self.on_heartbeat_tick(&mut actions),
            Input::SendRequested(command) => self.on_send_requested(command, &mut actions),
            Input::CloseRequested => {
                self.intentional_close = true;
                match self.state {
                    SessionState::Disconnected | SessionState::Closing => {}
                    _ => {
                        self.state = SessionState::Closing;
                        actions.push(Action::Disconnect);
                    }
                }
            }
            Input::TransportClosed => {
                if self.state != SessionState::Disconnected {
                    self.state = SessionState::Disconnected;
                    actions.push(Action::Notify(SessionEvent::Disconnected));
                    self.complete_if_oneshot(false, &mut actions);
                }
            }
        }
        actions
    }

    fn on_bytes(&mut self, data: &[u8], actions: &mut Vec<Action>) {
        match self.state {
            SessionState::Authenticating(_) => {
                self.buffer.push(data);
                self.advance_authentication(actions);
            }
            SessionState::Ready | SessionState::Busy => {
                self.buffer.push(data);
                self.forward_lines(actions);
            }
            // Data racing a close or arriving pre-connect is meaningless.
            _ => {}
        }
    }

    /// Drive the prompt-matching handshake as far as the buffered bytes
    /// allow. Prompts are bare literals without terminators, so each stage
    /// is a substring search; garbled prompts simply never match and the
    /// session sits in its current stage until a timeout-driven close.
    fn advance_authentication(&mut self, actions: &mut Vec<Action>) {
        while let SessionState::Authenticating(stage) = self.state {
            match stage {
                AuthStage::Login => {
                    if !self.buffer.contains(&self.config.login_prompt) {
                        return;
                    }
                    self.buffer.clear();
                    actions.push(Action::Transmit(self.username.clone()));
                    self.state = SessionState::Authenticating(AuthStage::Password);
                }
                AuthStage::Password => {
                    if !self.buffer.contains(&self.config.password_prompt) {
                        return;
                    }
                    self.buffer.clear();
                    actions.push(Action::Transmit(self.password.clone()));
                    self.state = SessionState::Authenticating(AuthStage::Confirm);
                }
                AuthStage::Confirm => {
                    // A re-issued login prompt after the password was sent
                    // means the credentials were rejected.
                    if self.buffer.contains(&self.config.login_prompt) {
                        actions.push(Action::Notify(SessionEvent::LoginFailed));
                        self.intentional_close = true;
                        self.state = SessionState::Closing;
                        actions.push(Action::Disconnect);
                        return;
                    }
                    if !self.buffer.contains(&self.config.shell_prompt) {
                        return;
                    }
                    self.buffer.clear();
                    self.alive = true;
                    actions.push(Action::Notify(SessionEvent::Connected));
                    if self.mode == Mode::Persistent {
                        actions.push(Action::StartHeartbeat);
                    }
                    self.enter_ready(actions);
                    return;
                }
            }
        }
    }

    /// Dispatch the next pending command, or idle in `Ready`. A one-shot
    /// session with nothing left to send is already done; it must not park
    /// until the deadline reaps it.
    fn enter_ready(&mut self, actions: &mut Vec<Action>) {
        if let Some(front) = self.pending.front() {
            actions.push(Action::Transmit(front.clone()));
            self.state = SessionState::Busy;
        } else if self.mode == Mode::OneShot {
            self.batch_done = true;
            self.intentional_close = true;
            self.state = SessionState::Closing;
            actions.push(Action::CompleteBatch(true));
            actions.push(Action::Disconnect);
        } else {
            self.state = SessionState::Ready;
        }
    }

    /// Forward every complete acknowledgement line and advance the batch.
    ///
    /// A line qualifies unless it is empty or an exact echo of the shell
    /// prompt. Each qualifying line acknowledges the in-flight command.
    fn forward_lines(&mut self, actions: &mut Vec<Action>) {
        let lines = self.buffer.drain_lines();
        self.buffer.discard_trailing(&self.config.shell_prompt);

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            if line.trim_end() == self.config.shell_prompt.trim_end() {
                continue;
            }

            self.alive = true;
            actions.push(Action::Notify(SessionEvent::Response(line)));

            if self.state != SessionState::Busy {
                continue;
            }
            self.pending.pop_front();
            if let Some(next) = self.pending.front() {
                actions.push(Action::Transmit(next.clone()));
            } else if self.mode == Mode::OneShot {
                self.batch_done = true;
                self.intentional_close = true;
                self.state = SessionState::Closing;
                actions.push(Action::CompleteBatch(true));
                actions.push(Action::Disconnect);
                return;
            } else {
                self.state = SessionState::Ready;
            }
        }
    }

    /// Liveness check: a tick with traffic since the previous tick sends
    /// the no-op probe (one request/ack cycle like any other command); a
    /// tick without traffic force-terminates the connection.
    fn on_heartbeat_tick(&mut self, actions: &mut Vec<Action>) {
        if !matches!(self.state, SessionState::Ready | SessionState::Busy) {
            return;
        }

        if self.alive {
            self.alive = false;
            self.pending.push_back(self.config.noop_command.clone());
            if self.state == SessionState::Ready {
                self.enter_ready(actions);
            }
            return;
        }

        debug!("Heartbeat timed out, terminating connection");
        self.state = SessionState::Closing;
        actions.push(Action::Disconnect);
    }

    fn on_send_requested(&mut self, command: String, actions: &mut Vec<Action>) {
        match self.state {
            SessionState::Ready => {
                self.pending.push_back(command);
                self.enter_ready(actions);
            }
            SessionState::Busy
            | SessionState::Connecting
            | SessionState::Authenticating(_) => {
                // Queued behind the in-flight command (or the handshake).
                self.pending.push_back(command);
            }
            SessionState::Disconnected | SessionState::Closing => {
                debug!(%command, "Dropping command, session not connected");
            }
        }
    }

    fn complete_if_oneshot(&mut self, success: bool, actions: &mut Vec<Action>) {
        if self.mode == Mode::OneShot && !self.batch_done {
            self.batch_done = true;
            actions.push(Action::CompleteBatch(success));
        }
    }
}
