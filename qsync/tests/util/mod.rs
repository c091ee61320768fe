//! Scripted controller endpoint for session integration tests.
//!
//! Speaks just enough of the prompt protocol to exercise the real TCP
//! drivers: issues `login: ` and `password: ` prompts, presents the shell
//! prompt, and acknowledges commands per the configured behavior.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use qsync::session::{SessionEvent, Target};

/// How the scripted controller treats commands after authentication.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Acknowledge every command.
    AckAll,
    /// Acknowledge only the first N commands, then go silent.
    AckFirst(usize),
    /// Re-issue the login prompt after the password, rejecting the session.
    RejectLogin,
    /// Authenticate normally but never acknowledge anything.
    SilentAfterLogin,
}

/// A listening scripted controller. Accepts any number of connections, so
/// reconnecting clients land on a fresh scripted session each time.
pub struct FakeController {
    pub addr: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeController {
    pub async fn spawn(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let commands = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&commands);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(serve(stream, behavior, Arc::clone(&recorded)));
            }
        });

        Self { addr, commands }
    }

    /// A target pointing at this controller.
    pub fn target(&self) -> Target {
        Target {
            name: "fake".to_string(),
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            username: "lutron".to_string(),
            password: "lutron".to_string(),
        }
    }

    /// Every post-authentication command received so far, in arrival order.
    pub fn recorded(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

async fn serve(stream: TcpStream, behavior: Behavior, recorded: Arc<Mutex<Vec<String>>>) {
    let (read_half, mut writer) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let _ = writer.write_all(b"login: ").await;
    let Ok(Some(_username)) = lines.next_line().await else {
        return;
    };
    let _ = writer.write_all(b"password: ").await;
    let Ok(Some(_password)) = lines.next_line().await else {
        return;
    };

    if matches!(behavior, Behavior::RejectLogin) {
        let _ = writer.write_all(b"\r\nlogin: ").await;
        while let Ok(Some(_)) = lines.next_line().await {}
        return;
    }

    let _ = writer.write_all(b"\r\nQNET> ").await;

    let mut acked = 0usize;
    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.trim().to_string();
        if command.is_empty() {
            continue;
        }
        recorded.lock().unwrap().push(command.clone());

        let ack = match behavior {
            Behavior::AckAll => true,
            Behavior::AckFirst(n) => acked < n,
            Behavior::SilentAfterLogin => false,
            Behavior::RejectLogin => false,
        };
        if ack {
            acked += 1;
            let reply = format!("~{command}\r\nQNET> ");
            if writer.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

/// Receive the next session event, failing the test on a 2s stall.
pub async fn expect_event(events: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("event channel closed unexpectedly")
}
