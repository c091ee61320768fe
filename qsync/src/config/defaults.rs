//! Default configuration values.
//!
//! Single source of truth for every documented default; the INI file only
//! overlays these.

/// Movement beyond this distance from the last synced position triggers a
/// resync (100 miles).
pub const DEFAULT_DEVIATION_METERS: f64 = 160_934.0;

/// A sync older than this many days triggers a resync without movement.
pub const DEFAULT_STALENESS_DAYS: i64 = 1;

/// Wall-clock bound on one one-shot batch delivery.
pub const DEFAULT_SYNC_DEADLINE_SECS: u64 = 10;

/// Interval between liveness probes on a persistent session.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 10;

/// Fixed delay before a reconnection attempt.
pub const DEFAULT_RECONNECT_SECS: u64 = 10;

/// UDP port the GPS receiver broadcasts to.
pub const DEFAULT_RECEIVER_PORT: u16 = 23232;

/// Controllers listen on the telnet port.
pub const DEFAULT_CONTROLLER_PORT: u16 = 23;

/// Factory-default controller credentials.
pub const DEFAULT_CONTROLLER_USERNAME: &str = "lutron";
pub const DEFAULT_CONTROLLER_PASSWORD: &str = "lutron";
