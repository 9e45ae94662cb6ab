//! Config loading helpers for CLI surfaces.

use frame_config::{
    AppEnv, ValidatedAppConfig, load_app_config_from_path, to_pretty_json, to_pretty_yaml,
};
use frame_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Output format for a rendered config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigOutputFormat {
    /// Pretty JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl FromStr for ConfigOutputFormat {
    type Err = ErrorEnvelope;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ErrorEnvelope::expected(
                ErrorCode::new("infra", "unsupported_output_format"),
                "output format must be json or yaml",
            )
            .with_metadata("format", input.to_string())),
        }
    }
}

/// Load and validate the effective config from an env map and optional file.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<ValidatedAppConfig> {
    let env = AppEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_app_config_from_path(config_path, &env)
}

/// Render a validated config deterministically, secrets redacted.
pub fn render_config(
    config: &ValidatedAppConfig,
    format: ConfigOutputFormat,
) -> InfraResult<String> {
    match format {
        ConfigOutputFormat::Json => to_pretty_json(config),
        ConfigOutputFormat::Yaml => to_pretty_yaml(config),
    }
}
