//! Remote command sessions with QNET-style controllers.
//!
//! A session is one authenticated TCP connection to a line-oriented
//! controller shell. The protocol has no structured handshake: the device
//! emits bare prompt literals (`login: `, `password: `, `QNET> `) and the
//! session advances by substring-matching them in the byte stream — a
//! deliberate fidelity to the device, fragility included.
//!
//! Two flavors share one state machine:
//!
//! - **One-shot** ([`deliver`]): drain a single command batch under a
//!   deadline, then close; used by the sync orchestrator.
//! - **Persistent** ([`SessionClient`]): a long-lived control channel with
//!   heartbeat liveness probing and indefinite fixed-delay reconnection.
//!
//! # Components
//!
//! - [`fsm`] - the pure state machine with typed inputs and actions
//! - [`config`] - `Target` and `SessionConfig`
//! - [`error`] - the failure taxonomy
//! - `wire` - prompt/line scanning over the raw byte stream
//! - `client` - the persistent-mode tokio driver
//! - `oneshot` - deadline-bounded batch delivery

mod client;
pub mod config;
mod error;
pub mod fsm;
mod oneshot;
mod wire;

pub use client::{SessionClient, SessionHandle};
pub use config::{SessionConfig, Target};
pub use error::SessionError;
pub use fsm::SessionEvent;
pub use oneshot::{deliver, SyncResult};
