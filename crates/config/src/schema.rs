//! Application configuration schema, defaults, and validation.
//!
//! - Deserialization is format-agnostic `serde`; every field has a default so
//!   a partial file (or no file) still yields a complete config.
//! - Unknown keys are rejected so typos surface instead of silently falling
//!   back to defaults.
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.

use frame_ports::{DEFAULT_ROTATION_WINDOW_DAYS, LogLevel};
use frame_shared::{ErrorCode, ErrorEnvelope, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const PORT_MIN: u32 = 1;
const PORT_MAX: u32 = 65_535;
const ROTATION_WINDOW_DAYS_MIN: u32 = 1;
const ROTATION_WINDOW_DAYS_MAX: u32 = 365;

/// Default HTTP port.
pub const DEFAULT_PORT: u32 = 8080;
/// Default base directory of log files.
pub const DEFAULT_LOG_PATH: &str = "./";
/// Default log file prefix.
pub const DEFAULT_LOG_PREFIX: &str = "log";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct AppConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// HTTP listen port.
    pub port: u32,
    /// Run mode.
    pub mode: Mode,
    /// Base directory of log files. Joined to the file name by plain string
    /// concatenation, so it normally ends with a separator.
    pub log_path: Box<str>,
    /// Logger settings.
    pub log: LogConfig,
    /// Redis connection settings.
    pub redis: RedisConfig,
    /// `MySQL` connection settings.
    pub mysql: MysqlConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            port: DEFAULT_PORT,
            mode: Mode::default(),
            log_path: DEFAULT_LOG_PATH.into(),
            log: LogConfig::default(),
            redis: RedisConfig::default(),
            mysql: MysqlConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate the config and wrap it.
    pub fn validate(self) -> Result<ValidatedAppConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        check_range("app", "port", self.port, PORT_MIN, PORT_MAX)?;
        self.log.validate()?;
        check_range("redis", "port", self.redis.port, PORT_MIN, PORT_MAX)?;
        check_range("mysql", "port", self.mysql.port, PORT_MIN, PORT_MAX)?;
        Ok(ValidatedAppConfig { raw: self })
    }
}

/// Validated config wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAppConfig {
    raw: AppConfig,
}

impl ValidatedAppConfig {
    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &AppConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> AppConfig {
        self.raw
    }
}

impl AsRef<AppConfig> for ValidatedAppConfig {
    fn as_ref(&self) -> &AppConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedAppConfig {
    type Target = AppConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Run mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Development.
    #[default]
    Debug,
    /// Production.
    Release,
    /// Test runs.
    Test,
}

impl Mode {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Test => "test",
        }
    }

    /// Parse a wire name, case-insensitively.
    #[must_use]
    pub fn from_name(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "release" => Some(Self::Release),
            "test" => Some(Self::Test),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LogConfig {
    /// File name prefix, as in `<prefix>-2024-3-1.log`.
    pub prefix: Box<str>,
    /// Minimum severity written.
    pub level: LogLevel,
    /// Mirror each record to stdout before the file write.
    pub echo_stdout: bool,
    /// Days after which the sink drops its cached handle and re-checks the file.
    pub rotation_window_days: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_LOG_PREFIX.into(),
            level: LogLevel::Debug,
            echo_stdout: true,
            rotation_window_days: DEFAULT_ROTATION_WINDOW_DAYS,
        }
    }
}

impl LogConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        let prefix = self.prefix.trim();
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(ConfigSchemaError::InvalidLogPrefix {
                prefix: self.prefix.to_string(),
            });
        }
        check_range(
            "log",
            "rotationWindowDays",
            self.rotation_window_days,
            ROTATION_WINDOW_DAYS_MIN,
            ROTATION_WINDOW_DAYS_MAX,
        )
    }
}

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RedisConfig {
    /// ACL user.
    pub user: Box<str>,
    /// Password.
    pub password: SecretString,
    /// Host name.
    pub host: Box<str>,
    /// Port.
    pub port: u32,
    /// Extra client options.
    pub options: BTreeMap<Box<str>, Box<str>>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            user: Box::default(),
            password: SecretString::default(),
            host: "127.0.0.1".into(),
            port: 6379,
            options: BTreeMap::new(),
        }
    }
}

impl RedisConfig {
    /// `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `MySQL` connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct MysqlConfig {
    /// User.
    pub user: Box<str>,
    /// Password.
    pub password: SecretString,
    /// Port.
    pub port: u32,
    /// Connection character set.
    pub charset: Box<str>,
    /// Host name.
    pub host: Box<str>,
    /// Database name.
    pub db_name: Box<str>,
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            user: "root".into(),
            password: SecretString::default(),
            port: 3306,
            charset: "utf8mb4".into(),
            host: "127.0.0.1".into(),
            db_name: Box::default(),
        }
    }
}

impl MysqlConfig {
    /// Driver DSN: `user:password@tcp(host:port)/db?charset=..&parseTime=True&loc=Local`.
    ///
    /// The result embeds the password, so it is returned as a secret.
    #[must_use]
    pub fn dsn(&self) -> SecretString {
        SecretString::new(format!(
            "{}:{}@tcp({}:{})/{}?charset={}&parseTime=True&loc=Local",
            self.user,
            self.password.expose(),
            self.host,
            self.port,
            self.db_name,
            self.charset
        ))
    }
}

fn check_range(
    section: &'static str,
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ConfigSchemaError> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ConfigSchemaError::LimitOutOfRange {
        section,
        field,
        value: u64::from(value),
        min: u64::from(min),
        max: u64::from(max),
    })
}

/// Schema validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    #[error("unsupported config version: {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A numeric limit is out of bounds.
    #[error("{section}.{field} must be within [{min}, {max}] (got {value})")]
    LimitOutOfRange {
        /// Schema section (e.g. `log`).
        section: &'static str,
        /// Field name in the config file (e.g. `rotationWindowDays`).
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// The log prefix is empty or contains a path separator.
    #[error("log.prefix must be non-empty and free of path separators (got {prefix:?})")]
    InvalidLogPrefix {
        /// Rejected prefix.
        prefix: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
            Self::InvalidLogPrefix { .. } => ErrorCode::new("config", "invalid_log_prefix"),
        }
    }
}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::InvalidLogPrefix { prefix } => {
                envelope.with_metadata("prefix", prefix)
            },
        }
    }
}
