//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Args, Parser, Subcommand};
use commands::{run_config_show, run_log, run_users_add, run_users_find, run_users_get};
use error::{CliError, ExitCode};
use format::{FormatArg, LevelArg};
use frame_infra::init_diagnostics;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FRAME_";

#[derive(Debug, Parser)]
#[command(
    name = "frame",
    version,
    about = "Rotating JSON logs, layered config and a user store",
    long_about = None
)]
struct Cli {
    /// Config file path (YAML, JSON or TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Write one record through the configured logger.
    Log {
        /// Severity.
        #[arg(value_enum)]
        level: LevelArg,
        /// Message text.
        message: String,
        /// Content values; each is parsed as JSON, else kept as a string.
        #[arg(allow_hyphen_values = true)]
        content: Vec<String>,
    },
    /// User store commands.
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config (defaults, file, env) with secrets redacted.
    Show {
        /// Output format.
        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    /// SQLite database file.
    #[arg(long)]
    db: PathBuf,
}

#[derive(Debug, Subcommand)]
enum UsersCommands {
    /// Create a user.
    Add {
        #[command(flatten)]
        db: DbArgs,
        /// Login name (4 to 12 characters).
        #[arg(long)]
        name: String,
        /// Password (6 to 120 characters).
        #[arg(long)]
        password: String,
        /// Role code (at least 2).
        #[arg(long, default_value_t = 2)]
        status: u32,
    },
    /// Show one user by id.
    Get {
        #[command(flatten)]
        db: DbArgs,
        /// User id.
        id: u64,
    },
    /// List users whose name contains a fragment.
    Find {
        #[command(flatten)]
        db: DbArgs,
        /// Name fragment; empty matches everyone.
        #[arg(default_value = "")]
        name: String,
        /// Page number, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Rows per page.
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    init_diagnostics();
    let cli = Cli::parse();
    let env = collect_scoped_env(ENV_PREFIX);

    match run(&cli.command, &env, cli.config.as_deref()) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(
    command: &Commands,
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> Result<CliOutput, CliError> {
    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Show { format } => run_config_show(env, config_path, *format),
        },
        Commands::Log {
            level,
            message,
            content,
        } => run_log(env, config_path, (*level).into(), message, content),
        Commands::Users { command } => match command {
            UsersCommands::Add {
                db,
                name,
                password,
                status,
            } => run_users_add(&db.db, name, password, *status),
            UsersCommands::Get { db, id } => run_users_get(&db.db, *id),
            UsersCommands::Find {
                db,
                name,
                page,
                page_size,
            } => run_users_find(&db.db, name, *page, *page_size),
        },
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}
