//! `tracing` subscriber for internal diagnostics (dropped records, mirror
//! failures). Product log records never go through here.

use tracing_subscriber::EnvFilter;

/// Env var holding the diagnostics filter directive.
pub const DIAGNOSTICS_ENV: &str = "FRAME_DIAGNOSTICS";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter for a raw directive, falling back to `warn` when absent or invalid.
pub fn diagnostics_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the stderr diagnostics subscriber. A second call is a no-op.
pub fn init_diagnostics() {
    let directive = std::env::var(DIAGNOSTICS_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(diagnostics_filter(directive.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_bad_directive_falls_back_to_warn() {
        assert_eq!(diagnostics_filter(None).to_string(), "warn");
        assert_eq!(diagnostics_filter(Some("  ")).to_string(), "warn");
        assert_eq!(diagnostics_filter(Some("frame=loud")).to_string(), "warn");
    }

    #[test]
    fn explicit_directive_is_used() {
        assert_eq!(diagnostics_filter(Some("debug")).to_string(), "debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_diagnostics();
        init_diagnostics();
    }
}
