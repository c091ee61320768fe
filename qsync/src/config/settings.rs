//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. These are
//! pure data types with no parsing logic.

use std::time::Duration;

use super::defaults::{
    DEFAULT_DEVIATION_METERS, DEFAULT_HEARTBEAT_SECS, DEFAULT_RECEIVER_PORT,
    DEFAULT_RECONNECT_SECS, DEFAULT_STALENESS_DAYS, DEFAULT_SYNC_DEADLINE_SECS,
};
use crate::position::FilterThresholds;
use crate::receiver::FixReceiverConfig;
use crate::session::{SessionConfig, Target};

/// Complete application configuration loaded from the INI file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Resync thresholds and delivery deadline.
    pub sync: SyncSettings,
    /// Persistent-session timing.
    pub session: SessionSettings,
    /// UDP listener settings.
    pub receiver: ReceiverSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
    /// One entry per `[controller:<name>]` section.
    pub targets: Vec<Target>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            sync: SyncSettings::default(),
            session: SessionSettings::default(),
            receiver: ReceiverSettings::default(),
            logging: LoggingSettings::default(),
            targets: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Filter thresholds derived from the `[sync]` section.
    pub fn thresholds(&self) -> FilterThresholds {
        FilterThresholds {
            deviation_meters: self.sync.deviation_meters,
            staleness_days: self.sync.staleness_days,
        }
    }

    /// Session configuration derived from the `[session]` section.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            heartbeat_interval: self.session.heartbeat_interval,
            reconnect_delay: self.session.reconnect_delay,
            ..SessionConfig::default()
        }
    }

    /// Receiver configuration derived from the `[receiver]` section.
    pub fn receiver_config(&self) -> FixReceiverConfig {
        FixReceiverConfig {
            port: self.receiver.port,
            ..FixReceiverConfig::default()
        }
    }
}

/// `[sync]` section.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Deviation threshold in meters.
    pub deviation_meters: f64,
    /// Staleness threshold in days.
    pub staleness_days: i64,
    /// One-shot delivery deadline.
    pub deadline: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            deviation_meters: DEFAULT_DEVIATION_METERS,
            staleness_days: DEFAULT_STALENESS_DAYS,
            deadline: Duration::from_secs(DEFAULT_SYNC_DEADLINE_SECS),
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Interval between liveness probes.
    pub heartbeat_interval: Duration,
    /// Fixed delay before reconnection.
    pub reconnect_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            reconnect_delay: Duration::from_secs(DEFAULT_RECONNECT_SECS),
        }
    }
}

/// `[receiver]` section.
#[derive(Debug, Clone)]
pub struct ReceiverSettings {
    /// UDP listen port.
    pub port: u16,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_RECEIVER_PORT,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Directory for log files.
    pub directory: String,
    /// Log file name.
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: crate::logging::default_log_dir().to_string(),
            file: crate::logging::default_log_file().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = ConfigFile::default();
        assert_eq!(config.sync.deviation_meters, 160_934.0);
        assert_eq!(config.sync.staleness_days, 1);
        assert_eq!(config.sync.deadline, Duration::from_secs(10));
        assert_eq!(config.session.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(config.session.reconnect_delay, Duration::from_secs(10));
        assert_eq!(config.receiver.port, 23232);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_derived_configs() {
        let config = ConfigFile::default();
        assert_eq!(config.thresholds().deviation_meters, 160_934.0);
        assert_eq!(
            config.session_config().heartbeat_interval,
            Duration::from_secs(10)
        );
        assert_eq!(config.receiver_config().port, 23232);
    }
}
