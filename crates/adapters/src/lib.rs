//! # frame-adapters
//!
//! Adapter implementations for ports: log sinks, the JSON logger, the clock
//! and the SQLite user repository.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod clock;
pub mod log_sink;
pub mod logger;
pub mod rotating_file;
/// SQLite user storage.
pub mod user_sqlite;

pub use clock::{Clock, ManualClock, SystemClock};
pub use log_sink::{LogSink, NetworkLogSink, StderrLogSink, StdoutLogSink, TeeLogSink};
pub use logger::JsonLogger;
pub use rotating_file::RotatingFileSink;
pub use user_sqlite::SqliteUserRepository;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
