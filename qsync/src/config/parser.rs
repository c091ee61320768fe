//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.
//! Starts from `ConfigFile::default()` and overlays any values found.

use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};

use super::defaults::{
    DEFAULT_CONTROLLER_PASSWORD, DEFAULT_CONTROLLER_PORT, DEFAULT_CONTROLLER_USERNAME,
};
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::session::Target;

/// Section name prefix for controller targets: `[controller:<name>]`.
const CONTROLLER_PREFIX: &str = "controller:";

/// Parse an `Ini` object into a `ConfigFile`.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("sync")) {
        if let Some(v) = section.get("deviation_meters") {
            let meters: f64 = parse_value("sync", "deviation_meters", v)?;
            if meters <= 0.0 {
                return Err(invalid("sync", "deviation_meters", v, "must be positive"));
            }
            config.sync.deviation_meters = meters;
        }
        if let Some(v) = section.get("staleness_days") {
            let days: i64 = parse_value("sync", "staleness_days", v)?;
            if days < 1 {
                return Err(invalid("sync", "staleness_days", v, "must be at least 1"));
            }
            config.sync.staleness_days = days;
        }
        if let Some(v) = section.get("deadline_secs") {
            config.sync.deadline = parse_seconds("sync", "deadline_secs", v)?;
        }
    }

    if let Some(section) = ini.section(Some("session")) {
        if let Some(v) = section.get("heartbeat_secs") {
            config.session.heartbeat_interval = parse_seconds("session", "heartbeat_secs", v)?;
        }
        if let Some(v) = section.get("reconnect_secs") {
            config.session.reconnect_delay = parse_seconds("session", "reconnect_secs", v)?;
        }
    }

    if let Some(section) = ini.section(Some("receiver")) {
        if let Some(v) = section.get("port") {
            config.receiver.port = parse_value("receiver", "port", v)?;
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            config.logging.directory = v.to_string();
        }
        if let Some(v) = section.get("file") {
            config.logging.file = v.to_string();
        }
    }

    for (section_name, properties) in ini.iter() {
        if let Some(name) = section_name.and_then(|s| s.strip_prefix(CONTROLLER_PREFIX)) {
            config.targets.push(parse_target(name, properties)?);
        }
    }

    Ok(config)
}

/// Parse one `[controller:<name>]` section.
fn parse_target(name: &str, properties: &Properties) -> Result<Target, ConfigFileError> {
    let section = format!("{CONTROLLER_PREFIX}{name}");

    let host = properties
        .get("host")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigFileError::MissingKey {
            section: section.clone(),
            key: "host".to_string(),
        })?;

    let port = match properties.get("port") {
        Some(v) => parse_value(&section, "port", v)?,
        None => DEFAULT_CONTROLLER_PORT,
    };

    Ok(Target {
        name: name.to_string(),
        host: host.to_string(),
        port,
        username: properties
            .get("username")
            .unwrap_or(DEFAULT_CONTROLLER_USERNAME)
            .to_string(),
        password: properties
            .get("password")
            .unwrap_or(DEFAULT_CONTROLLER_PASSWORD)
            .to_string(),
    })
}

fn parse_value<T: FromStr>(section: &str, key: &str, raw: &str) -> Result<T, ConfigFileError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(section, key, raw, "not a valid number"))
}

fn parse_seconds(section: &str, key: &str, raw: &str) -> Result<Duration, ConfigFileError> {
    let secs: u64 = parse_value(section, key, raw)?;
    if secs == 0 {
        return Err(invalid(section, key, raw, "must be at least 1"));
    }
    Ok(Duration::from_secs(secs))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
