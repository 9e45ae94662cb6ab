//! # frame-config
//!
//! Configuration schema, validation, and loading for the frame backend.
//! Sources merge as env > file > defaults. This crate depends on `ports`
//! (for `LogLevel`) and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{AppEnv, EnvParseError, apply_env_overrides};
pub use load::{
    ConfigFormat, load_app_config_from_path, load_app_config_from_str, load_app_config_std_env,
    to_pretty_json, to_pretty_yaml,
};
pub use schema::{
    AppConfig, CURRENT_CONFIG_VERSION, ConfigSchemaError, LogConfig, Mode, MysqlConfig,
    RedisConfig, ValidatedAppConfig,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_ports::ports_crate_version;
    use frame_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        assert!(!config_crate_version().is_empty());
    }

    #[test]
    fn config_can_use_ports_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
