//! Builds the process logger from config.
//!
//! The logger is constructed once at startup and handed to consumers as an
//! `Arc<JsonLogger>`; nothing here installs a global.

use frame_adapters::{
    Clock, JsonLogger, LogSink, RotatingFileSink, StdoutLogSink, SystemClock, TeeLogSink,
};
use frame_config::AppConfig;
use std::sync::Arc;

/// Build the configured logger on the system clock.
pub fn build_logger(config: &AppConfig) -> Arc<JsonLogger> {
    build_logger_with_clock(config, Arc::new(SystemClock))
}

/// Build the configured logger; the sink and the timestamps share `clock`.
pub fn build_logger_with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Arc<JsonLogger> {
    let file = RotatingFileSink::new(config.log_path.clone(), config.log.prefix.clone())
        .with_rotation_window_days(config.log.rotation_window_days)
        .with_clock(Arc::clone(&clock));

    let sink: Arc<dyn LogSink> = if config.log.echo_stdout {
        Arc::new(TeeLogSink::new(Arc::new(file)).with_mirror(Arc::new(StdoutLogSink)))
    } else {
        Arc::new(file)
    };

    tracing::debug!(
        log_path = %config.log_path,
        prefix = %config.log.prefix,
        level = %config.log.level,
        echo_stdout = config.log.echo_stdout,
        "process logger built"
    );

    Arc::new(
        JsonLogger::new(sink)
            .with_clock(clock)
            .with_min_level(config.log.level),
    )
}
