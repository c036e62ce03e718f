//! Application configuration loading and validation.
//!
//! Configuration is resolved from two layered sources: a TOML file named
//! `config` inside the directory given on the command line, and environment
//! variables, with the environment always overriding the file. This lets a
//! deployment change any value without editing the file.
//!
//! The loaded structure is validated in a single pass and returned as a plain
//! value. Callers pass it (or its sub-sections) to the components that need
//! it; nothing in this module holds global state.
//!
//! # Environment Variables
//!
//! Every file key has an environment twin, section and key joined by `__`:
//!
//! - `GENERAL__API_PORT` overrides `[general] api_port`
//! - `DATABASE__DB_PASSWORD` overrides `[database] db_password`
//!
//! A `.env` file in the working directory is honored as well (loaded before
//! the environment source is read).

use std::path::Path;

use config::{Environment, File, FileFormat};
use serde::Deserialize;

/// Log levels the server accepts, in lowercase canonical form.
const VALID_LOG_LEVELS: [&str; 5] = ["debug", "info", "warning", "error", "fatal"];

/// Errors raised while loading or validating configuration.
///
/// Validation variants name the offending file key so the operator can fix
/// the exact field. Only the first violation found is reported.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The `config` file could not be found or read.
    #[error("unable to read config file: {0}")]
    Read(config::ConfigError),

    /// The file was read but its contents do not map onto the expected
    /// shape (malformed TOML, wrong type for a field, missing field).
    #[error("unable to decode config file: {0}")]
    Decode(config::ConfigError),

    /// `api_port` is outside the range the server may bind.
    #[error("api_port must be between 1000 and 9999, got {0}")]
    PortOutOfRange(u16),

    /// `log_level` is not one of the recognized levels.
    #[error("log_level {0:?} is not one of debug, info, warning, error, fatal")]
    InvalidLogLevel(String),

    /// A required database field was present but empty.
    #[error("required database field {0} is empty")]
    EmptyField(&'static str),
}

/// Application configuration.
///
/// Built once at startup by [`load`] and immutable afterwards. The serde
/// renames are the declarative mapping between file keys and field names,
/// so the wire format can stay stable if fields are renamed internally.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server settings, `[general]` section of the file.
    #[serde(rename = "general")]
    pub server: ServerConfig,

    /// Database settings, `[database]` section of the file.
    #[serde(rename = "database")]
    pub database: DatabaseConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to.
    #[serde(rename = "api_address")]
    pub address: String,

    /// Port the server binds to. Must be within 1000..=9999.
    #[serde(rename = "api_port")]
    pub port: u16,

    /// File the server logs to. Falls back to stdout if it cannot be opened.
    #[serde(rename = "log_file")]
    pub log_file: String,

    /// Minimum level that gets logged: debug, info, warning, error or fatal.
    /// Matched case-insensitively and stored lowercase.
    #[serde(rename = "log_level")]
    pub log_level: String,
}

/// Database settings.
///
/// The string fields are all required and must be non-empty. The numeric
/// pool and retry knobs may be zero or omitted, in which case [`Config::validate`]
/// fills in the documented defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Name of the database to use.
    #[serde(rename = "db_name")]
    pub db_name: String,

    /// User to authenticate as.
    #[serde(rename = "db_user")]
    pub user: String,

    /// Password to authenticate with.
    #[serde(rename = "db_password")]
    pub password: String,

    /// Host the database listens on.
    #[serde(rename = "db_address")]
    pub address: String,

    /// Port the database listens on.
    #[serde(rename = "db_port")]
    pub port: u16,

    /// Most idle connections the pool keeps warm. 0 means the default of 10.
    #[serde(rename = "db_max_idle_conns", default)]
    pub max_idle_conns: u32,

    /// Most connections the pool opens at once. 0 means the default of 100.
    #[serde(rename = "db_max_open_conns", default)]
    pub max_open_conns: u32,

    /// Hard timeout on each connection attempt, in seconds. 0 means the
    /// default of 30.
    #[serde(rename = "db_connect_timeout_secs", default)]
    pub connect_timeout_secs: u64,

    /// How many times to attempt the initial connection before giving up.
    /// 0 means the default of 3.
    #[serde(rename = "db_connect_attempts", default)]
    pub connect_attempts: u32,
}

/// Load, validate and normalize configuration.
///
/// Reads the TOML file named `config` inside `config_dir`, layers
/// environment variables on top (environment wins), decodes the result and
/// runs [`Config::validate`].
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is missing or unreadable, if the
/// decoded data does not fit the [`Config`] shape, or if any validation
/// invariant is violated. The caller decides what to do with the failure;
/// this function never exits the process.
pub fn load(config_dir: &Path) -> Result<Config, ConfigError> {
    // Pick up a .env file if one exists (does nothing if not found)
    dotenvy::dotenv().ok();

    // File first, environment second: later sources override earlier ones
    let source = config::Config::builder()
        .add_source(File::from(config_dir.join("config")).format(FileFormat::Toml))
        .add_source(Environment::default().separator("__").try_parsing(true))
        .build()
        .map_err(ConfigError::Read)?;

    let mut config: Config = source.try_deserialize().map_err(ConfigError::Decode)?;
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Check every validation invariant and apply numeric defaults.
    ///
    /// Checks run in a fixed order and stop at the first violation: port
    /// range, log level membership, then the required database string fields
    /// (name, user, password, address). Defaulting of the numeric fields is
    /// normalization, not validation, and never fails.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        // Check if port is between 1000 and 9999
        if self.server.port < 1000 || self.server.port > 9999 {
            return Err(ConfigError::PortOutOfRange(self.server.port));
        }

        // Make sure log level is valid, accepting any casing
        let level = self.server.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.server.log_level.clone()));
        }
        self.server.log_level = level;

        // Make sure all required database string fields are filled,
        // reporting the file key of the first empty one
        let required = [
            ("db_name", &self.database.db_name),
            ("db_user", &self.database.user),
            ("db_password", &self.database.password),
            ("db_address", &self.database.address),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(ConfigError::EmptyField(key));
            }
        }

        // Fill in defaults for the numeric fields left at zero
        if self.database.max_idle_conns == 0 {
            self.database.max_idle_conns = 10;
        }
        if self.database.max_open_conns == 0 {
            self.database.max_open_conns = 100;
        }
        if self.database.connect_timeout_secs == 0 {
            self.database.connect_timeout_secs = 30;
        }
        if self.database.connect_attempts == 0 {
            self.database.connect_attempts = 3;
        }

        Ok(())
    }
}
