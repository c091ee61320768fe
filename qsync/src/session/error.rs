//! Session error taxonomy.
//!
//! Every failure is local to one session/target: persistent sessions absorb
//! errors and reconnect, one-shot deliveries absorb them and report failure.
//! Nothing here is ever fatal to the long-running process.

use std::io;
use std::time::Duration;

/// Errors raised while driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level failure to establish the byte stream. Triggers the
    /// reconnect policy in persistent mode; immediate failure in one-shot
    /// mode.
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Login rejected. Treated as a configuration problem, not transient:
    /// persistent mode does not reconnect after this.
    #[error("login rejected by {addr}")]
    AuthenticationFailed { addr: String },

    /// One-shot batch not drained before the deadline.
    #[error("command batch not drained within {0:?}")]
    DeadlineExceeded(Duration),

    /// Mid-session I/O failure.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}
