//! Argument value types and output helpers for CLI commands.

use clap::ValueEnum;
use frame_infra::ConfigOutputFormat;
use frame_ports::LogLevel;
use serde::Serialize;
use serde_json::Value;

/// Output format choices for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Pretty JSON.
    Json,
    /// YAML.
    Yaml,
}

impl From<FormatArg> for ConfigOutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Yaml => Self::Yaml,
        }
    }
}

/// Severity choices for `log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    Panic,
}

impl From<LevelArg> for LogLevel {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::Debug => Self::Debug,
            LevelArg::Info => Self::Info,
            LevelArg::Warn => Self::Warn,
            LevelArg::Error => Self::Error,
            LevelArg::Panic => Self::Panic,
        }
    }
}

/// Parse a positional content argument: JSON when it parses, else a string.
pub fn parse_content(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Pretty JSON with a trailing newline.
pub fn to_pretty_json_line<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut output = serde_json::to_string_pretty(value)?;
    output.push('\n');
    Ok(output)
}
