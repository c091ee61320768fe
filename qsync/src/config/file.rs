//! Config file loading.

use std::path::Path;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::parser::parse_ini;
use super::settings::ConfigFile;

/// Errors from loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read or is not well-formed INI.
    #[error("Failed to load config file {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: ini::Error,
    },

    /// A key holds a value that cannot be used.
    #[error("Invalid value for [{section}] {key} = \"{value}\": {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// A required key is absent.
    #[error("Missing required key \"{key}\" in [{section}]")]
    MissingKey { section: String, key: String },
}

impl ConfigFile {
    /// Load configuration from an INI file at `path`.
    ///
    /// Missing sections and keys fall back to defaults; only the values
    /// present in the file are overlaid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|e| ConfigFileError::Load {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = parse_ini(&ini)?;
        debug!(
            path = %path.display(),
            targets = config.targets.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}
