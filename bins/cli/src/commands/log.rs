//! Log command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::parse_content;
use frame_infra::{build_logger, load_effective_config};
use frame_ports::{CallerLocation, LogEvent, LogLevel};
use std::collections::BTreeMap;
use std::path::Path;

/// Write one record through the configured logger.
///
/// `panic` records are written like any other level; the process keeps
/// running and exits normally.
pub fn run_log(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    level: LogLevel,
    message: &str,
    content: &[String],
) -> Result<CliOutput, CliError> {
    let config = load_effective_config(env, config_path)?;
    let logger = build_logger(&config);

    let content = content.iter().map(|raw| parse_content(raw)).collect();
    logger.try_log(LogEvent::new(
        level,
        message,
        content,
        CallerLocation::caller(),
    ))?;

    Ok(CliOutput {
        stdout: String::new(),
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
