//! Users command handlers.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::to_pretty_json_line;
use frame_infra::open_user_repository;
use frame_ports::{NewUser, Page, UserId, UserRepositoryPort, UserStatus};
use frame_shared::{ErrorCode, ErrorEnvelope};
use std::path::Path;

/// Insert a user and print the stored row.
pub fn run_users_add(
    db_path: &Path,
    user_name: &str,
    password: &str,
    status: u32,
) -> Result<CliOutput, CliError> {
    let status = UserStatus::new(status).map_err(ErrorEnvelope::from)?;
    let user = NewUser::new(user_name, password, status).map_err(ErrorEnvelope::from)?;
    let repo = open_user_repository(db_path)?;
    let stored = repo.insert(user)?;

    ok_json(&stored)
}

/// Print one user by id.
pub fn run_users_get(db_path: &Path, id: u64) -> Result<CliOutput, CliError> {
    let repo = open_user_repository(db_path)?;
    let user = repo.get_user(UserId::new(id))?.ok_or_else(|| {
        ErrorEnvelope::expected(ErrorCode::not_found(), "user not found")
            .with_metadata("id", id.to_string())
    })?;

    ok_json(&user)
}

/// Print one page of users whose name contains `fragment`.
pub fn run_users_find(
    db_path: &Path,
    fragment: &str,
    page: u32,
    page_size: u32,
) -> Result<CliOutput, CliError> {
    let page = Page::new(page, page_size).map_err(ErrorEnvelope::from)?;
    let repo = open_user_repository(db_path)?;
    let users = repo.find_many(fragment, page)?;

    ok_json(&users)
}

fn ok_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<CliOutput, CliError> {
    Ok(CliOutput {
        stdout: to_pretty_json_line(value)?,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
