//! UDP listener for inbound GPS datagrams.
//!
//! Listens for NMEA sentences broadcast by the GPS receiver and converts
//! them to [`PositionFix`] values for the sync orchestrator.
//!
//! Each datagram is expected to carry exactly one sentence; malformed
//! payloads are dropped silently (at trace level). Fixes without an
//! acquired position are forwarded as-is — the resync filter rejects them,
//! keeping validity handling in one place.
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut rx) = mpsc::channel(16);
//! let receiver = FixReceiver::with_defaults(tx);
//! let handle = receiver.start();
//!
//! while let Some(fix) = rx.recv().await {
//!     println!("Fix: {}, {}", fix.latitude, fix.longitude);
//! }
//! ```

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::defaults::DEFAULT_RECEIVER_PORT;
use crate::position::{nmea, PositionFix};

/// Maximum datagram size we expect; NMEA sentences are at most 82 bytes.
const MAX_DATAGRAM_SIZE: usize = 256;

/// Fix receiver configuration.
#[derive(Debug, Clone)]
pub struct FixReceiverConfig {
    /// UDP port to listen on.
    pub port: u16,

    /// Timeout for socket receive operations; bounds how long the task
    /// takes to notice a closed channel.
    pub recv_timeout: Duration,
}

impl Default for FixReceiverConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_RECEIVER_PORT,
            recv_timeout: Duration::from_millis(500),
        }
    }
}

/// Error type for the fix receiver.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    /// Failed to bind the UDP socket.
    #[error("Failed to bind UDP socket on port {port}: {source}")]
    SocketBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// UDP receiver for GPS position datagrams.
///
/// Parses each datagram as one NMEA sentence and sends the resulting
/// [`PositionFix`] to the orchestrator via a channel.
pub struct FixReceiver {
    config: FixReceiverConfig,
    fix_tx: mpsc::Sender<PositionFix>,
}

impl FixReceiver {
    /// Create a new fix receiver.
    pub fn new(config: FixReceiverConfig, fix_tx: mpsc::Sender<PositionFix>) -> Self {
        Self { config, fix_tx }
    }

    /// Create with default configuration.
    pub fn with_defaults(fix_tx: mpsc::Sender<PositionFix>) -> Self {
        Self::new(FixReceiverConfig::default(), fix_tx)
    }

    /// Get the configured port.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Start the receiver.
    ///
    /// Spawns an async task that listens for UDP datagrams until the fix
    /// channel closes.
    pub fn start(self) -> tokio::task::JoinHandle<Result<(), ReceiverError>> {
        tokio::spawn(self.run())
    }

    async fn run(self) -> Result<(), ReceiverError> {
        let socket = UdpSocket::bind(format!("0.0.0.0:{}", self.config.port))
            .await
            .map_err(|e| ReceiverError::SocketBind {
                port: self.config.port,
                source: e,
            })?;

        info!(port = self.config.port, "Fix receiver started");

        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];
        let mut datagrams_received: u64 = 0;
        let mut fixes_sent: u64 = 0;

        loop {
            if self.fix_tx.is_closed() {
                debug!("Fix channel closed, stopping receiver");
                break;
            }

            let recv_result =
                tokio::time::timeout(self.config.recv_timeout, socket.recv(&mut buffer)).await;

            match recv_result {
                Ok(Ok(len)) => {
                    datagrams_received += 1;
                    self.log_first_datagram(datagrams_received, &buffer[..len]);

                    if let Some(fix) = nmea::parse_sentence(&buffer[..len]) {
                        fixes_sent += 1;
                        self.send_fix(fix, fixes_sent);
                    } else if datagrams_received <= 5 {
                        let preview = String::from_utf8_lossy(&buffer[..len.min(50)]);
                        debug!(datagram_num = datagrams_received, preview = %preview, "Unparseable datagram");
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "UDP receive error");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                Err(_) => {
                    trace!("No position data received (timeout)");
                }
            }
        }

        info!(datagrams_received, fixes_sent, "Fix receiver stopped");
        Ok(())
    }

    fn log_first_datagram(&self, datagrams_received: u64, data: &[u8]) {
        if datagrams_received == 1 {
            let preview = String::from_utf8_lossy(&data[..data.len().min(20)]).to_string();
            info!(
                port = self.config.port,
                preview = %preview,
                len = data.len(),
                "Received first position datagram"
            );
        }
    }

    fn send_fix(&self, fix: PositionFix, fixes_sent: u64) {
        // try_send: fixes arrive faster than syncs complete, and a dropped
        // sample costs nothing — the next datagram replaces it.
        match self.fix_tx.try_send(fix) {
            Ok(()) => {
                if fixes_sent == 1 {
                    info!(
                        lat = fix.latitude,
                        lon = fix.longitude,
                        valid = fix.valid,
                        "First fix sent to orchestrator"
                    );
                }
            }
            Err(e) => {
                trace!("Fix dropped: {}", e);
            }
        }
    }
}
