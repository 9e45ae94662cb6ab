//! Integration tests for loading config fixtures from disk.

use frame_config::{AppEnv, CURRENT_CONFIG_VERSION, Mode, load_app_config_from_path};
use frame_ports::LogLevel;
use frame_shared::ErrorCode;
use std::error::Error;
use std::path::{Path, PathBuf};

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

#[test]
fn loads_valid_yaml_fixture() -> Result<(), Box<dyn Error>> {
    let config = load_app_config_from_path(
        Some(&fixture("config.valid.yaml")),
        &AppEnv::default(),
    )?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.port, 8081);
    assert_eq!(config.mode, Mode::Release);
    assert_eq!(&*config.log_path, "./logs/");
    assert_eq!(&*config.log.prefix, "app");
    assert_eq!(config.log.level, LogLevel::Info);
    assert!(!config.log.echo_stdout);
    assert_eq!(config.log.rotation_window_days, 10);
    assert_eq!(config.redis.address(), "redis.internal:6380");
    assert_eq!(
        config.redis.options.get("poolSize").map(|value| &**value),
        Some("16")
    );
    assert_eq!(
        config.mysql.dsn().expose(),
        "frame:mysql-pass@tcp(db.internal:3306)/frame?charset=utf8mb4&parseTime=True&loc=Local"
    );
    Ok(())
}

#[test]
fn toml_fixture_matches_defaults() -> Result<(), Box<dyn Error>> {
    let config = load_app_config_from_path(
        Some(&fixture("config.default.toml")),
        &AppEnv::default(),
    )?;
    assert_eq!(*config, frame_config::AppConfig::default());
    Ok(())
}

#[test]
fn invalid_fixture_reports_error_code() -> Result<(), Box<dyn Error>> {
    let error = load_app_config_from_path(
        Some(&fixture("config.invalid.yaml")),
        &AppEnv::default(),
    )
    .err()
    .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "invalid_limit"));
    assert_eq!(
        error.metadata.get("section").map(String::as_str),
        Some("log")
    );
    assert_eq!(
        error.metadata.get("field").map(String::as_str),
        Some("rotationWindowDays")
    );
    Ok(())
}

#[test]
fn no_file_yields_defaults() -> Result<(), Box<dyn Error>> {
    let config = load_app_config_from_path(None, &AppEnv::default())?;
    assert_eq!(config.into_inner(), frame_config::AppConfig::default());
    Ok(())
}
