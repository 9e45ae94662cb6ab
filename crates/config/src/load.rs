//! Defaults, then the optional file, then `FRAME_*` env; validated once at
//! the end.

use crate::{AppConfig, AppEnv, ValidatedAppConfig, apply_env_overrides};
use frame_shared::{ErrorClass, ErrorCode, ErrorEnvelope, ResultExt};
use std::path::Path;

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`.
    Yaml,
    /// `.json`.
    Json,
    /// `.toml`.
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .yaml, .yml, .json or .toml",
            )
            .with_metadata("extension", other.unwrap_or_default().to_string())),
        }
    }
}

/// Load the app config from in-memory text.
///
/// Precedence (highest wins):
/// - env overrides (`AppEnv`)
/// - config text
/// - defaults (`AppConfig::default()`)
pub fn load_app_config_from_str(
    input: Option<(&str, ConfigFormat)>,
    env: &AppEnv,
) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let config = match input {
        None => AppConfig::default(),
        Some((text, format)) => parse_config_unvalidated(text, format)?,
    };

    // env is applied last and also validates the resulting config.
    apply_env_overrides(config, env)
}

/// Load the app config from an optional file path.
pub fn load_app_config_from_path(
    config_path: Option<&Path>,
    env: &AppEnv,
) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let config = match config_path {
        None => AppConfig::default(),
        Some(path) => {
            let format = ConfigFormat::from_path(path)?;
            let config_text = read_config_file(path)?;
            parse_config_unvalidated(&config_text, format)
                .with_metadata("path", path.display().to_string())?
        },
    };

    apply_env_overrides(config, env)
}

/// Load the app config from std env and an optional file path.
pub fn load_app_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedAppConfig, ErrorEnvelope> {
    let env = AppEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_app_config_from_path(config_path, &env)
}

/// Pretty JSON with a trailing newline. Secrets print as `[REDACTED]`.
pub fn to_pretty_json(config: &AppConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_json"),
            format!("config JSON encoding failed: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// YAML rendering of the same document.
pub fn to_pretty_yaml(config: &AppConfig) -> Result<String, ErrorEnvelope> {
    serde_yaml_ng::to_string(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_yaml"),
            format!("config YAML encoding failed: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn parse_config_unvalidated(input: &str, format: ConfigFormat) -> Result<AppConfig, ErrorEnvelope> {
    let (code, parsed): (&str, Result<AppConfig, String>) = match format {
        ConfigFormat::Yaml => (
            "invalid_yaml",
            serde_yaml_ng::from_str(input).map_err(|error| error.to_string()),
        ),
        ConfigFormat::Json => (
            "invalid_json",
            serde_json::from_str(input).map_err(|error| error.to_string()),
        ),
        ConfigFormat::Toml => (
            "invalid_toml",
            toml::from_str(input).map_err(|error| error.to_string()),
        ),
    };
    parsed.map_err(|reason| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", code),
            format!("config file is not valid {format:?}: {reason}"),
        )
    })
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path)
        .map_err(|error| {
            let code = match error.kind() {
                std::io::ErrorKind::NotFound => "config_file_not_found",
                std::io::ErrorKind::PermissionDenied => "config_file_permission_denied",
                _ => "config_file_io",
            };
            ErrorEnvelope::expected(
                ErrorCode::new("config", code),
                format!("can't read config file: {error}"),
            )
        })
        .with_metadata("path", path.display().to_string())
}
