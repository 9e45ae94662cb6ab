//! Structured logging boundary contract.
//!
//! Application code talks to a [`LoggerPort`] through five severity methods.
//! Each method records the source location of its *caller* via
//! `#[track_caller]`, so the reported file/line is the application call site
//! no matter how many `#[track_caller]` helpers sit between it and
//! [`LoggerPort::log`]. Wrappers that are not `#[track_caller]` should build a
//! [`LogEvent`] with an explicit [`CallerLocation`] instead.
//!
//! Severity methods return `()`: a failed write is dropped from the caller's
//! point of view. Adapters may expose a fallible entry point separately.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

/// Days a rotating file sink keeps its cached handle before re-opening.
pub const DEFAULT_ROTATION_WINDOW_DAYS: u32 = 10;

/// Log severity, ordered by increasing urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warning. Serialized as `warn`.
    #[serde(alias = "warning")]
    Warn,
    /// Error.
    Error,
    /// Panic. A record label only; emitting it never unwinds or aborts.
    Panic,
}

impl LogLevel {
    /// All levels from least to most urgent.
    pub const ALL: [Self; 5] = [
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Panic,
    ];

    /// Wire name used in the `level` field of a record.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Panic => "panic",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unknown level name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLogLevelError(pub String);

impl fmt::Display for ParseLogLevelError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "unknown log level `{}` (expected debug, info, warn, error, or panic)",
            self.0
        )
    }
}

impl std::error::Error for ParseLogLevelError {}

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "panic" => Ok(Self::Panic),
            _ => Err(ParseLogLevelError(input.to_string())),
        }
    }
}

/// Source location a record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerLocation {
    /// Source file path as reported by the compiler.
    pub file: Cow<'static, str>,
    /// 1-based line number.
    pub line: u32,
}

impl CallerLocation {
    /// Explicit location, for wrappers that cannot use `#[track_caller]`.
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&'static Location<'static>> for CallerLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }
}

impl fmt::Display for CallerLocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.file, self.line)
    }
}

/// Named fields attached to every event of a child logger.
pub type LogFields = BTreeMap<Box<str>, Value>;

/// Structured log event, before timestamping and encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// Severity.
    pub level: LogLevel,
    /// Message, written verbatim.
    pub message: Box<str>,
    /// Positional values, in call order.
    pub content: Vec<Value>,
    /// Call site the event is attributed to.
    pub caller: CallerLocation,
}

impl LogEvent {
    /// Build an event with an explicit caller location.
    pub fn new(
        level: LogLevel,
        message: impl Into<Box<str>>,
        content: Vec<Value>,
        caller: CallerLocation,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            content,
            caller,
        }
    }

    /// Build an event attributed to the nearest non-`#[track_caller]` caller.
    #[track_caller]
    pub fn here(level: LogLevel, message: impl Into<Box<str>>, content: &[Value]) -> Self {
        Self::new(level, message, content.to_vec(), CallerLocation::caller())
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit one event. Failures are not reported to the caller.
    fn log(&self, event: LogEvent);

    /// Create a child logger with named fields applied to every event.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;
}

/// Severity methods for every logger, `dyn LoggerPort` included.
///
/// These resolve statically through the blanket impl, so `#[track_caller]`
/// reaches the real call site even behind a trait object; only
/// [`LoggerPort::log`] is dispatched dynamically.
pub trait LoggerExt: LoggerPort {
    /// Emit at `level`, attributed to the caller.
    #[track_caller]
    fn emit(&self, level: LogLevel, message: &str, content: &[Value]) {
        self.log(LogEvent::here(level, message, content));
    }

    /// Debug event.
    #[track_caller]
    fn debug(&self, message: &str, content: &[Value]) {
        self.emit(LogLevel::Debug, message, content);
    }

    /// Info event.
    #[track_caller]
    fn info(&self, message: &str, content: &[Value]) {
        self.emit(LogLevel::Info, message, content);
    }

    /// Warning event.
    #[track_caller]
    fn warn(&self, message: &str, content: &[Value]) {
        self.emit(LogLevel::Warn, message, content);
    }

    /// Error event.
    #[track_caller]
    fn error(&self, message: &str, content: &[Value]) {
        self.emit(LogLevel::Error, message, content);
    }

    /// Panic-level event. Only writes a record; callers that need to stop
    /// the process must do so themselves after this returns.
    #[track_caller]
    fn panic(&self, message: &str, content: &[Value]) {
        self.emit(LogLevel::Panic, message, content);
    }
}

impl<T: LoggerPort + ?Sized> LoggerExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<LogEvent>>,
    }

    impl LoggerPort for Recorder {
        fn log(&self, event: LogEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }

        fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
            Box::new(Self::default())
        }
    }

    #[track_caller]
    fn helper(logger: &dyn LoggerPort) {
        logger.warn("from helper", &[]);
    }

    #[test]
    fn levels_are_ordered_and_round_trip_names() -> Result<(), ParseLogLevelError> {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::Panic);
        for level in LogLevel::ALL {
            assert_eq!(level.as_str().parse::<LogLevel>()?, level);
        }
        assert_eq!("Warning".parse::<LogLevel>()?, LogLevel::Warn);
        assert!("fatal".parse::<LogLevel>().is_err());
        Ok(())
    }

    #[test]
    fn severity_methods_attribute_the_call_site() -> Result<(), Box<dyn std::error::Error>> {
        let recorder = Recorder::default();

        let line = line!() + 1;
        recorder.info("user created", &[json!(42), json!("alice")]);
        let helper_line = line!() + 1;
        helper(&recorder);

        let events = recorder.events.lock().map_err(|_| "poisoned")?;
        let first = events.first().ok_or("missing event")?;
        assert_eq!(first.level, LogLevel::Info);
        assert_eq!(&*first.message, "user created");
        assert_eq!(first.content, vec![json!(42), json!("alice")]);
        assert_eq!(first.caller.file, file!());
        assert_eq!(first.caller.line, line);

        let second = events.get(1).ok_or("missing helper event")?;
        assert_eq!(second.level, LogLevel::Warn);
        assert_eq!(second.caller.line, helper_line);
        Ok(())
    }

    #[test]
    fn explicit_location_is_kept() {
        let event = LogEvent::new(
            LogLevel::Error,
            "boom",
            Vec::new(),
            CallerLocation::new("handler.rs", 88),
        );
        assert_eq!(event.caller.to_string(), "handler.rs:88");
    }
}
