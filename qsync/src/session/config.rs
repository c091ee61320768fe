//! Session configuration and target definitions.

use std::time::Duration;

use crate::config::defaults::{DEFAULT_HEARTBEAT_SECS, DEFAULT_RECONNECT_SECS};

/// Login prompt literal sent by the controller before authentication.
pub const LOGIN_PROMPT: &str = "login: ";

/// Password prompt literal.
pub const PASSWORD_PROMPT: &str = "password: ";

/// Shell prompt literal indicating the controller is ready for a command.
pub const SHELL_PROMPT: &str = "QNET> ";

/// No-op command used as a liveness probe; any response counts.
pub const NOOP_COMMAND: &str = "gettime";

/// One remote controller endpoint.
///
/// Static configuration; immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Human-readable name from the config file section.
    pub name: String,
    /// Hostname or IP address.
    pub host: String,
    /// TCP port (controllers listen on the telnet port by default).
    pub port: u16,
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl Target {
    /// `host:port` form suitable for `TcpStream::connect`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Tunables for one session.
///
/// The prompt literals are a property of the device's shell, not of the
/// deployment; they are configurable only so tests can exercise odd prompts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Literal matched in the byte stream to detect the login prompt.
    pub login_prompt: String,
    /// Literal matched to detect the password prompt.
    pub password_prompt: String,
    /// Literal matched to detect the ready shell prompt; also filtered out
    /// of forwarded acknowledgements.
    pub shell_prompt: String,
    /// Command sent as a liveness probe.
    pub noop_command: String,
    /// Interval between liveness checks (persistent mode).
    pub heartbeat_interval: Duration,
    /// Fixed delay before a reconnection attempt (persistent mode).
    pub reconnect_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_prompt: LOGIN_PROMPT.to_string(),
            password_prompt: PASSWORD_PROMPT.to_string(),
            shell_prompt: SHELL_PROMPT.to_string(),
            noop_command: NOOP_COMMAND.to_string(),
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            reconnect_delay: Duration::from_secs(DEFAULT_RECONNECT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.login_prompt, "login: ");
        assert_eq!(config.password_prompt, "password: ");
        assert_eq!(config.shell_prompt, "QNET> ");
        assert_eq!(config.noop_command, "gettime");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(config.reconnect_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_target_addr() {
        let target = Target {
            name: "main".to_string(),
            host: "192.168.1.20".to_string(),
            port: 23,
            username: "lutron".to_string(),
            password: "lutron".to_string(),
        };
        assert_eq!(target.addr(), "192.168.1.20:23");
    }
}
