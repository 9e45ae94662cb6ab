//! Config command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::FormatArg;
use frame_infra::{load_effective_config, render_config};
use std::collections::BTreeMap;
use std::path::Path;

/// Print the effective config (defaults, file, env) with secrets redacted.
pub fn run_config_show(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    format: FormatArg,
) -> Result<CliOutput, CliError> {
    let config = load_effective_config(env, config_path)?;
    let stdout = render_config(&config, format.into())?;

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
