//! Structured JSON logger adapter.
//!
//! Each event becomes one line:
//! `{"ts":..,"level":..,"msg":..,"content":[..],"file":..,"line":..}` with an
//! optional trailing `fields` object for child loggers.

use crate::clock::{Clock, SystemClock};
use crate::log_sink::LogSink;
use chrono::SecondsFormat;
use frame_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use frame_shared::{ErrorClass, ErrorCode, ErrorEnvelope, REDACTED, Result, is_secret_key};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    fields: LogFields,
    min_level: LogLevel,
}

#[derive(Serialize)]
struct Record<'a> {
    ts: String,
    level: LogLevel,
    msg: &'a str,
    content: &'a [Value],
    file: &'a str,
    line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a LogFields>,
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink. Every level is
    /// written until [`Self::with_min_level`] says otherwise.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            clock: Arc::new(SystemClock),
            fields: LogFields::new(),
            min_level: LogLevel::Debug,
        }
    }

    /// Replace the timestamp clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set named fields applied to every event.
    #[must_use]
    pub fn with_fields(mut self, fields: LogFields) -> Self {
        self.fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Encode and write one event, returning the sink result.
    ///
    /// Events below the minimum level are skipped and report `Ok(0)`.
    pub fn try_log(&self, event: LogEvent) -> Result<usize> {
        if event.level < self.min_level {
            return Ok(0);
        }
        let line = self.encode(event)?;
        self.sink.write(&line)
    }

    fn encode(&self, event: LogEvent) -> Result<Vec<u8>> {
        let mut content = event.content;
        content.iter_mut().for_each(redact_value);

        let mut fields = self.fields.clone();
        redact_fields(&mut fields);

        let record = Record {
            ts: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, false),
            level: event.level,
            msg: &event.message,
            content: &content,
            file: &event.caller.file,
            line: event.caller.line,
            fields: (!fields.is_empty()).then_some(&fields),
        };

        let mut line = serde_json::to_vec(&record).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("logger", "serialize_failed"),
                format!("log serialization failed: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
        line.push(b'\n');
        Ok(line)
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        let level = event.level;
        let caller = event.caller.clone();
        if let Err(error) = self.try_log(event) {
            tracing::warn!(
                code = %error.code,
                %level,
                %caller,
                %error,
                "log record dropped"
            );
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.fields.clone();
        merged.extend(fields);
        Box::new(self.clone().with_fields(merged))
    }
}

fn redact_fields(fields: &mut LogFields) {
    for (key, value) in fields.iter_mut() {
        if is_secret_key(key) {
            *value = Value::String(REDACTED.to_string());
        } else {
            redact_value(value);
        }
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_secret_key(key) {
                    *nested = Value::String(REDACTED.to_string());
                } else {
                    redact_value(nested);
                }
            }
        },
        Value::Array(items) => {
            for item in items {
                redact_value(item);
            }
        },
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Local, TimeZone};
    use frame_ports::{CallerLocation, LoggerExt};
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl MemorySink {
        fn take(&self) -> Vec<String> {
            let mut guard = self
                .lines
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::take(&mut *guard)
        }
    }

    impl LogSink for MemorySink {
        fn write(&self, buf: &[u8]) -> Result<usize> {
            let mut guard = self
                .lines
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.push(String::from_utf8_lossy(buf).into_owned());
            Ok(buf.len())
        }
    }

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn write(&self, _buf: &[u8]) -> Result<usize> {
            Err(ErrorEnvelope::expected(
                ErrorCode::new("log_sink", "open_failed"),
                "can't open new logfile",
            ))
        }
    }

    fn only_line(sink: &MemorySink) -> std::result::Result<Value, Box<dyn std::error::Error>> {
        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        let line = lines.first().ok_or("missing line")?;
        assert!(line.ends_with('\n'));
        Ok(serde_json::from_str(line.trim_end())?)
    }

    #[test]
    fn record_keys_are_in_wire_order() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone());

        logger.log(LogEvent::new(
            LogLevel::Info,
            "user created",
            vec![json!(42), json!("alice")],
            CallerLocation::new("handler.rs", 88),
        ));

        let lines = sink.take();
        let line = lines.first().ok_or("missing line")?;
        let keys = [
            "\"ts\"",
            "\"level\"",
            "\"msg\"",
            "\"content\"",
            "\"file\"",
            "\"line\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| line.find(key).ok_or("missing key"))
            .collect::<std::result::Result<_, _>>()?;
        assert!(positions.is_sorted());
        assert!(!line.contains("\"fields\""));
        Ok(())
    }

    #[test]
    fn timestamp_comes_from_the_clock() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let now = Local
            .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
            .single()
            .ok_or("ambiguous local time")?;
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone()).with_clock(Arc::new(ManualClock::new(now)));

        logger.debug("tick", &[]);

        let payload = only_line(&sink)?;
        let ts = payload.get("ts").and_then(Value::as_str).ok_or("missing ts")?;
        assert_eq!(
            chrono::DateTime::parse_from_rfc3339(ts)?,
            now.fixed_offset()
        );
        assert!(ts.contains(".000"));
        Ok(())
    }

    #[test]
    fn content_secrets_are_redacted() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone());

        let payload = json!({
            "user": "alice",
            "password": "hunter2", // pragma: allowlist secret
            "nested": { "token": "t" },
        });
        logger.error("login failed", &[payload]);

        let payload = only_line(&sink)?;
        let first = payload
            .get("content")
            .and_then(Value::as_array)
            .and_then(|content| content.first())
            .ok_or("missing content")?;
        assert_eq!(first.get("user"), Some(&json!("alice")));
        assert_eq!(first.get("password"), Some(&json!(REDACTED)));
        assert_eq!(
            first.get("nested").and_then(|nested| nested.get("token")),
            Some(&json!(REDACTED))
        );
        Ok(())
    }

    #[test]
    fn child_logger_merges_fields() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone());

        let mut fields = LogFields::new();
        fields.insert("requestId".into(), json!("req_123"));
        fields.insert("apiKey".into(), json!("secret"));
        let child = logger.child(fields);
        child.info("child log", &[]);

        let payload = only_line(&sink)?;
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .ok_or("missing fields")?;
        assert_eq!(fields.get("requestId"), Some(&json!("req_123")));
        assert_eq!(fields.get("apiKey"), Some(&json!(REDACTED)));
        Ok(())
    }

    #[test]
    fn min_level_filters_lower_levels() -> Result<()> {
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Warn);

        assert_eq!(logger.try_log(LogEvent::here(LogLevel::Info, "skip", &[]))?, 0);
        assert!(logger.try_log(LogEvent::here(LogLevel::Panic, "keep", &[]))? > 0);
        assert_eq!(sink.take().len(), 1);
        Ok(())
    }

    #[test]
    fn sink_failure_is_swallowed_by_facade_but_visible_to_try_log() {
        let logger = JsonLogger::new(Arc::new(BrokenSink));

        logger.panic("still returns", &[]);

        let error = logger
            .try_log(LogEvent::here(LogLevel::Error, "visible", &[]))
            .err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("log_sink", "open_failed"))
        );
    }

    fn content_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9 ]{0,16}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn content_keeps_length_and_order(
            content in prop::collection::vec(content_value(), 0..12)
        ) {
            let sink = Arc::new(MemorySink::default());
            let logger = JsonLogger::new(sink.clone());

            logger.info("values", &content);

            let payload = only_line(&sink).map_err(|error| TestCaseError::fail(error.to_string()))?;
            prop_assert_eq!(payload.get("content"), Some(&Value::Array(content)));
        }
    }
}
