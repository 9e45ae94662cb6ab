//! `FRAME_*` environment overrides.
//!
//! Env parsing is strict: a variable that is present but empty or
//! unparsable fails the load instead of being ignored. Secret values are
//! redacted in error metadata.

use crate::schema::{AppConfig, Mode, ValidatedAppConfig};
use frame_ports::LogLevel;
use frame_shared::{ErrorCode, ErrorEnvelope, REDACTED_VALUE, SecretString, is_secret_key};
use std::collections::BTreeMap;

/// Env var: HTTP port.
pub const ENV_PORT: &str = "FRAME_PORT";
/// Env var: run mode.
pub const ENV_MODE: &str = "FRAME_MODE";
/// Env var: base directory of log files.
pub const ENV_LOG_PATH: &str = "FRAME_LOG_PATH";
/// Env var: log file prefix.
pub const ENV_LOG_PREFIX: &str = "FRAME_LOG_PREFIX";
/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "FRAME_LOG_LEVEL";
/// Env var: mirror records to stdout.
pub const ENV_LOG_ECHO_STDOUT: &str = "FRAME_LOG_ECHO_STDOUT";
/// Env var: rotation window in days.
pub const ENV_LOG_ROTATION_WINDOW_DAYS: &str = "FRAME_LOG_ROTATION_WINDOW_DAYS";
/// Env var: `MySQL` host.
pub const ENV_MYSQL_HOST: &str = "FRAME_MYSQL_HOST";
/// Env var: `MySQL` port.
pub const ENV_MYSQL_PORT: &str = "FRAME_MYSQL_PORT";
/// Env var: `MySQL` user.
pub const ENV_MYSQL_USER: &str = "FRAME_MYSQL_USER";
/// Env var: `MySQL` password (secret).
pub const ENV_MYSQL_PASSWORD: &str = "FRAME_MYSQL_PASSWORD";
/// Env var: `MySQL` database name.
pub const ENV_MYSQL_DB_NAME: &str = "FRAME_MYSQL_DB_NAME";
/// Env var: `MySQL` charset.
pub const ENV_MYSQL_CHARSET: &str = "FRAME_MYSQL_CHARSET";
/// Env var: Redis host.
pub const ENV_REDIS_HOST: &str = "FRAME_REDIS_HOST";
/// Env var: Redis port.
pub const ENV_REDIS_PORT: &str = "FRAME_REDIS_PORT";
/// Env var: Redis user.
pub const ENV_REDIS_USER: &str = "FRAME_REDIS_USER";
/// Env var: Redis password (secret).
pub const ENV_REDIS_PASSWORD: &str = "FRAME_REDIS_PASSWORD";

const ALL_ENV_VARS: [&str; 17] = [
    ENV_PORT,
    ENV_MODE,
    ENV_LOG_PATH,
    ENV_LOG_PREFIX,
    ENV_LOG_LEVEL,
    ENV_LOG_ECHO_STDOUT,
    ENV_LOG_ROTATION_WINDOW_DAYS,
    ENV_MYSQL_HOST,
    ENV_MYSQL_PORT,
    ENV_MYSQL_USER,
    ENV_MYSQL_PASSWORD,
    ENV_MYSQL_DB_NAME,
    ENV_MYSQL_CHARSET,
    ENV_REDIS_HOST,
    ENV_REDIS_PORT,
    ENV_REDIS_USER,
    ENV_REDIS_PASSWORD,
];

/// Typed env-derived overrides for `AppConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppEnv {
    /// Override for `port`.
    pub port: Option<u32>,
    /// Override for `mode`.
    pub mode: Option<Mode>,
    /// Override for `logPath`.
    pub log_path: Option<Box<str>>,
    /// Override for `log.prefix`.
    pub log_prefix: Option<Box<str>>,
    /// Override for `log.level`.
    pub log_level: Option<LogLevel>,
    /// Override for `log.echoStdout`.
    pub log_echo_stdout: Option<bool>,
    /// Override for `log.rotationWindowDays`.
    pub log_rotation_window_days: Option<u32>,
    /// Override for `mysql.host`.
    pub mysql_host: Option<Box<str>>,
    /// Override for `mysql.port`.
    pub mysql_port: Option<u32>,
    /// Override for `mysql.user`.
    pub mysql_user: Option<Box<str>>,
    /// Override for `mysql.password`.
    pub mysql_password: Option<SecretString>,
    /// Override for `mysql.dbName`.
    pub mysql_db_name: Option<Box<str>>,
    /// Override for `mysql.charset`.
    pub mysql_charset: Option<Box<str>>,
    /// Override for `redis.host`.
    pub redis_host: Option<Box<str>>,
    /// Override for `redis.port`.
    pub redis_port: Option<u32>,
    /// Override for `redis.user`.
    pub redis_user: Option<Box<str>>,
    /// Override for `redis.password`.
    pub redis_password: Option<SecretString>,
}

impl AppEnv {
    /// Read overrides from an already-collected map of variables.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            port: parse_optional_u32(map, ENV_PORT)?,
            mode: parse_optional_enum(map, ENV_MODE, Mode::from_name)?,
            log_path: parse_optional_trimmed_string(map, ENV_LOG_PATH)?,
            log_prefix: parse_optional_trimmed_string(map, ENV_LOG_PREFIX)?,
            log_level: parse_optional_enum(map, ENV_LOG_LEVEL, |raw| raw.parse().ok())?,
            log_echo_stdout: parse_optional_bool(map, ENV_LOG_ECHO_STDOUT)?,
            log_rotation_window_days: parse_optional_u32(map, ENV_LOG_ROTATION_WINDOW_DAYS)?,
            mysql_host: parse_optional_trimmed_string(map, ENV_MYSQL_HOST)?,
            mysql_port: parse_optional_u32(map, ENV_MYSQL_PORT)?,
            mysql_user: parse_optional_trimmed_string(map, ENV_MYSQL_USER)?,
            mysql_password: parse_optional_secret(map, ENV_MYSQL_PASSWORD)?,
            mysql_db_name: parse_optional_trimmed_string(map, ENV_MYSQL_DB_NAME)?,
            mysql_charset: parse_optional_trimmed_string(map, ENV_MYSQL_CHARSET)?,
            redis_host: parse_optional_trimmed_string(map, ENV_REDIS_HOST)?,
            redis_port: parse_optional_u32(map, ENV_REDIS_PORT)?,
            redis_user: parse_optional_trimmed_string(map, ENV_REDIS_USER)?,
            redis_password: parse_optional_secret(map, ENV_REDIS_PASSWORD)?,
        })
    }

    /// Read overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = ALL_ENV_VARS
            .iter()
            .filter_map(|name| Some(((*name).to_string(), std::env::var(name).ok()?)))
            .collect();
        Self::from_map(&map)
    }
}

/// Apply env overrides to a base config (env wins over file/default values),
/// then validate the result.
pub fn apply_env_overrides(
    base: AppConfig,
    env: &AppEnv,
) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let mut config = base;

    set(&mut config.port, env.port);
    set(&mut config.mode, env.mode);
    set_cloned(&mut config.log_path, env.log_path.as_ref());
    set_cloned(&mut config.log.prefix, env.log_prefix.as_ref());
    set(&mut config.log.level, env.log_level);
    set(&mut config.log.echo_stdout, env.log_echo_stdout);
    set(
        &mut config.log.rotation_window_days,
        env.log_rotation_window_days,
    );

    set_cloned(&mut config.mysql.host, env.mysql_host.as_ref());
    set(&mut config.mysql.port, env.mysql_port);
    set_cloned(&mut config.mysql.user, env.mysql_user.as_ref());
    set_cloned(&mut config.mysql.password, env.mysql_password.as_ref());
    set_cloned(&mut config.mysql.db_name, env.mysql_db_name.as_ref());
    set_cloned(&mut config.mysql.charset, env.mysql_charset.as_ref());

    set_cloned(&mut config.redis.host, env.redis_host.as_ref());
    set(&mut config.redis.port, env.redis_port);
    set_cloned(&mut config.redis.user, env.redis_user.as_ref());
    set_cloned(&mut config.redis.password, env.redis_password.as_ref());

    config.validate().map_err(Into::into)
}

fn set<T: Copy>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn set_cloned<T: Clone>(field: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        field.clone_from(value);
    }
}

/// Why an env override was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvParseError {
    /// Set, but blank after trimming.
    #[error("{var} must be non-empty")]
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Not one of true/false/1/0/yes/no/on/off.
    #[error("{var} must be a boolean")]
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Not an unsigned 32-bit integer.
    #[error("{var} must be an integer")]
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Not a recognised name (mode, log level).
    #[error("{var} has an unsupported value")]
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidBool { var, value }
            | EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_value(var, &value)),
        }
    }
}

/// Trimmed value of `var`, `None` when unset. Set-but-blank is an error.
fn lookup<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<(&'a str, &'a String)>, EnvParseError> {
    match map.get(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Err(EnvParseError::EmptyValue { var }),
        Some(raw) => Ok(Some((raw.trim(), raw))),
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    Ok(lookup(map, var)?.map(|(value, _)| value.into()))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    Ok(lookup(map, var)?.map(|(value, _)| SecretString::new(value)))
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    lookup(map, var)?
        .map(|(value, raw)| {
            value.parse().map_err(|_| EnvParseError::InvalidInt {
                var,
                value: raw.clone(),
            })
        })
        .transpose()
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    parse_optional_enum(map, var, |value| {
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    })
    .map_err(|error| match error {
        EnvParseError::InvalidEnum { var, value } => EnvParseError::InvalidBool { var, value },
        other => other,
    })
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    lookup(map, var)?
        .map(|(value, raw)| {
            parse(value).ok_or_else(|| EnvParseError::InvalidEnum {
                var,
                value: raw.clone(),
            })
        })
        .transpose()
}

fn redact_value(var: &str, value: &str) -> String {
    if is_secret_key(var) {
        REDACTED_VALUE.to_string()
    } else {
        value.to_string()
    }
}
