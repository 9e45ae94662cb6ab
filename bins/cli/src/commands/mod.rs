//! CLI command handlers.

pub mod config;
pub mod log;
pub mod users;

pub use config::run_config_show;
pub use log::run_log;
pub use users::{run_users_add, run_users_find, run_users_get};
