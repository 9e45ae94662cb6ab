//! Byte sinks for encoded log records.
//!
//! A sink accepts one fully encoded record per call. Implementations must
//! write the buffer as a unit so concurrent callers never interleave partial
//! lines.

use frame_shared::{ErrorCode, ErrorEnvelope, Result};
use std::io::Write;
use std::sync::Arc;

/// A sink that durably stores or forwards encoded log records.
pub trait LogSink: Send + Sync {
    /// Write `buf` and return the number of bytes accepted.
    fn write(&self, buf: &[u8]) -> Result<usize>;
}

/// Log sink that writes to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutLogSink;

impl LogSink for StdoutLogSink {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(buf)
            .and_then(|()| stdout.flush())
            .map_err(|error| console_error("stdout", &error))?;
        Ok(buf.len())
    }
}

/// Log sink that writes to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(buf)
            .map_err(|error| console_error("stderr", &error))?;
        Ok(buf.len())
    }
}

fn console_error(stream: &str, error: &std::io::Error) -> ErrorEnvelope {
    ErrorEnvelope::wrap_io(
        ErrorCode::new("log_sink", "write_failed"),
        &format!("can't write log record to {stream}"),
        error,
    )
    .with_metadata("stream", stream)
}

/// Placeholder for a message-queue transport.
///
/// Accepts every buffer and reports it fully written; nothing leaves the
/// process.
#[derive(Debug, Default, Clone)]
pub struct NetworkLogSink {
    topic: Box<str>,
}

impl NetworkLogSink {
    /// Sink for `topic`.
    pub fn new(topic: impl Into<Box<str>>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    /// Destination topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl LogSink for NetworkLogSink {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        Ok(buf.len())
    }
}

/// Sink that forwards to a primary sink plus best-effort mirrors.
///
/// Mirrors are written first. Their failures are reported through `tracing`
/// and never change the result, which is always the primary's.
#[derive(Clone)]
pub struct TeeLogSink {
    primary: Arc<dyn LogSink>,
    mirrors: Vec<Arc<dyn LogSink>>,
}

impl TeeLogSink {
    /// Tee with no mirrors yet.
    #[must_use]
    pub fn new(primary: Arc<dyn LogSink>) -> Self {
        Self {
            primary,
            mirrors: Vec::new(),
        }
    }

    /// Add a mirror.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn LogSink>) -> Self {
        self.mirrors.push(mirror);
        self
    }
}

impl LogSink for TeeLogSink {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        for mirror in &self.mirrors {
            if let Err(error) = mirror.write(buf) {
                tracing::warn!(code = %error.code, %error, "log mirror write failed");
            }
        }
        self.primary.write(buf)
    }
}
