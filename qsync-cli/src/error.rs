//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use qsync::config::ConfigFileError;
use qsync::receiver::ReceiverError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(ConfigFileError),
    /// No [controller:<name>] sections in the config file
    NoTargets,
    /// Named controller is not in the config file
    UnknownTarget(String),
    /// UDP receiver failed
    Receiver(ReceiverError),
    /// UDP receiver task died without reporting (panic or cancellation)
    ReceiverTask(tokio::task::JoinError),
    /// One or more controllers did not acknowledge the batch
    SyncFailed,
    /// Runtime construction failed
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::NoTargets => {
                eprintln!();
                eprintln!("Add at least one controller section to the config file:");
                eprintln!("  [controller:main]");
                eprintln!("  host = 192.168.1.20");
            }
            CliError::Config(ConfigFileError::Load { .. }) => {
                eprintln!();
                eprintln!("Pass --config <path> if the file lives elsewhere.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::NoTargets => write!(f, "No controllers configured"),
            CliError::UnknownTarget(name) => {
                write!(f, "No controller named '{}' in the config file", name)
            }
            CliError::Receiver(e) => write!(f, "GPS receiver error: {}", e),
            CliError::ReceiverTask(e) => write!(f, "GPS receiver task failed: {}", e),
            CliError::SyncFailed => write!(f, "Sync failed: not all controllers acknowledged"),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Receiver(e) => Some(e),
            CliError::ReceiverTask(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}
