//! # frame-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `adapters`, `config`, `ports`, and `shared`.

/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Diagnostics subscriber for the library's own `tracing` events.
pub mod diagnostics;
/// Process logger composition.
pub mod logging;
/// User repository composition.
pub mod users;

pub use config_check::{
    ConfigOutputFormat, InfraError, InfraResult, load_effective_config, render_config,
};
pub use diagnostics::{DIAGNOSTICS_ENV, diagnostics_filter, init_diagnostics};
pub use logging::{build_logger, build_logger_with_clock};
pub use users::open_user_repository;

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_adapters::adapters_crate_version;
    use frame_config::config_crate_version;

    /// `frame-*` crates named under `[dependencies]` or `[dev-dependencies]`.
    fn workspace_deps() -> Vec<String> {
        let manifest = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut section = "";
        manifest
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter_map(|line| {
                if line.starts_with('[') {
                    section = line;
                    return None;
                }
                let in_deps = matches!(section, "[dependencies]" | "[dev-dependencies]");
                let name = line.split(['=', '.']).next().unwrap_or_default().trim();
                (in_deps && name.starts_with("frame-")).then(|| name.to_string())
            })
            .collect()
    }

    #[test]
    fn infra_does_not_depend_on_cli() {
        let deps = workspace_deps();
        assert!(!deps.iter().any(|dep| dep == "frame-cli"));
        assert!(deps.iter().any(|dep| dep == "frame-adapters"));
        assert!(deps.iter().any(|dep| dep == "frame-config"));
    }

    #[test]
    fn infra_can_use_adapters_and_config() {
        assert!(!infra_crate_version().is_empty());
        assert!(!adapters_crate_version().is_empty());
        assert!(!config_crate_version().is_empty());
    }
}
