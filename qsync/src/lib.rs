//! QSync - GPS-driven clock and location sync for QNET lighting controllers
//!
//! This library keeps one or more Lutron-style lighting controllers aligned
//! with a moving GPS receiver. Incoming NMEA datagrams are filtered for
//! meaningful movement (or staleness), and when a resync is warranted the
//! location, UTC offset, date, and time are pushed to every configured
//! controller over its line-oriented telnet shell.
//!
//! # High-Level Flow
//!
//! ```ignore
//! use qsync::config::ConfigFile;
//! use qsync::receiver::FixReceiver;
//! use qsync::sync::SyncOrchestrator;
//! use tokio::sync::mpsc;
//!
//! let config = ConfigFile::load("qsync.ini")?;
//! let (tx, rx) = mpsc::channel(16);
//!
//! FixReceiver::new(config.receiver_config(), tx).start();
//! SyncOrchestrator::from_config(&config).run(rx).await;
//! ```
//!
//! # Components
//!
//! - [`position`] - NMEA parsing, great-circle distance, and the resync filter
//! - [`timezone`] - coordinate to IANA zone resolution
//! - [`session`] - the authenticated session state machine (one-shot and persistent)
//! - [`sync`] - command batch construction and multi-target orchestration
//! - [`receiver`] - UDP listener for inbound position datagrams
//! - [`config`] - INI configuration file support
//! - [`logging`] - tracing setup with file and stdout output

pub mod config;
pub mod logging;
pub mod position;
pub mod receiver;
pub mod session;
pub mod sync;
pub mod timezone;

/// Version of the qsync library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
