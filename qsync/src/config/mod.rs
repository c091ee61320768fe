//! Application configuration.
//!
//! Configuration is loaded from a single INI file and overlaid on top of
//! built-in defaults. The layout:
//!
//! - [`defaults`] - the default values themselves
//! - `settings` - the typed sections ([`ConfigFile`] and friends)
//! - `parser` - INI key mapping
//! - `file` - file loading and [`ConfigFileError`]
//!
//! ```ini
//! [sync]
//! deviation_meters = 160934
//! staleness_days = 1
//! deadline_secs = 10
//!
//! [receiver]
//! port = 23232
//!
//! [controller:main]
//! host = 192.168.1.20
//! ```

pub mod defaults;
mod file;
mod parser;
mod settings;

pub use file::ConfigFileError;
pub use settings::{
    ConfigFile, LoggingSettings, ReceiverSettings, SessionSettings, SyncSettings,
};
