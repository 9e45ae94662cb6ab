//! Integration tests for the rotating file sink behind the JSON logger.

use chrono::{DateTime, Datelike, Duration, Local, TimeZone};
use frame_adapters::{Clock, JsonLogger, LogSink, ManualClock, RotatingFileSink};
use frame_ports::{CallerLocation, LogEvent, LogLevel, LoggerExt, LoggerPort};
use frame_shared::{ErrorCode, ErrorEnvelope, Result};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn base(dir: &Path) -> String {
    format!("{}/", dir.display())
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<DateTime<Local>> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .ok_or_else(|| {
            ErrorEnvelope::expected(ErrorCode::invalid_input(), "nonexistent local time")
        })
}

fn read_lines(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path)?;
    text.lines()
        .map(|line| {
            serde_json::from_str(line).map_err(|error| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    format!("bad json line: {error}"),
                )
            })
        })
        .collect()
}

struct Harness {
    dir: PathBuf,
    clock: Arc<ManualClock>,
    sink: Arc<RotatingFileSink>,
    logger: JsonLogger,
}

impl Harness {
    fn new(label: &str, start: DateTime<Local>) -> Self {
        let dir = temp_dir(label);
        let clock = Arc::new(ManualClock::new(start));
        let sink = Arc::new(RotatingFileSink::new(base(&dir), "app").with_clock(clock.clone()));
        let logger = JsonLogger::new(sink.clone()).with_clock(clock.clone());
        Self {
            dir,
            clock,
            sink,
            logger,
        }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

#[test]
fn info_record_lands_in_date_named_file() -> Result<()> {
    let harness = Harness::new("frame-log-example", at(2024, 3, 1, 10, 0)?);

    let line = line!() + 1;
    harness.logger.info("user created", &[json!(42), json!("alice")]);

    let records = read_lines(&harness.file("app-2024-3-1.log"))?;
    assert_eq!(records.len(), 1);
    let record = records
        .first()
        .ok_or_else(|| ErrorEnvelope::from(std::io::Error::other("empty")))?;
    assert_eq!(record.get("level"), Some(&json!("info")));
    assert_eq!(record.get("msg"), Some(&json!("user created")));
    assert_eq!(record.get("content"), Some(&json!([42, "alice"])));
    assert_eq!(record.get("file"), Some(&json!(file!())));
    assert_eq!(record.get("line"), Some(&json!(line)));
    Ok(())
}

#[test]
fn every_record_has_exactly_the_wire_keys() -> Result<()> {
    let harness = Harness::new("frame-log-schema", at(2024, 3, 1, 10, 0)?);

    for level in LogLevel::ALL {
        harness.logger.emit(level, "schema", &[json!({ "n": 1 }), json!(null)]);
    }

    let records = read_lines(&harness.file("app-2024-3-1.log"))?;
    assert_eq!(records.len(), LogLevel::ALL.len());
    for (record, level) in records.iter().zip(LogLevel::ALL) {
        let object = record
            .as_object()
            .ok_or_else(|| ErrorEnvelope::from(std::io::Error::other("not an object")))?;
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["content", "file", "level", "line", "msg", "ts"]);
        assert_eq!(record.get("level"), Some(&json!(level.as_str())));
        assert!(record.get("ts").and_then(Value::as_str).is_some_and(|ts| {
            DateTime::parse_from_rfc3339(ts).is_ok()
        }));
    }
    Ok(())
}

#[test]
fn crossing_midnight_switches_files() -> Result<()> {
    let harness = Harness::new("frame-log-rollover", at(2024, 3, 1, 23, 59)?);

    harness.logger.info("before midnight", &[]);
    harness.clock.advance(Duration::minutes(2));
    harness.logger.info("after midnight", &[]);

    let first = read_lines(&harness.file("app-2024-3-1.log"))?;
    let second = read_lines(&harness.file("app-2024-3-2.log"))?;
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(
        second.first().and_then(|record| record.get("msg")),
        Some(&json!("after midnight"))
    );
    Ok(())
}

#[test]
fn returning_to_an_existing_dated_file_appends() -> Result<()> {
    let harness = Harness::new("frame-log-return", at(2024, 3, 1, 12, 0)?);

    harness.logger.info("day one", &[]);
    harness.clock.set(at(2024, 3, 2, 12, 0)?);
    harness.logger.info("day two", &[]);
    harness.clock.set(at(2024, 3, 1, 13, 0)?);
    harness.logger.info("day one again", &[]);

    let first = read_lines(&harness.file("app-2024-3-1.log"))?;
    assert_eq!(first.len(), 2);
    assert_eq!(harness.sink.current_path(), base(&harness.dir) + "app-2024-3-1.log");
    Ok(())
}

#[test]
fn missing_directories_are_created() -> Result<()> {
    let dir = temp_dir("frame-log-mkdir");
    let nested = dir.join("a").join("b");
    let clock = Arc::new(ManualClock::new(at(2024, 3, 1, 10, 0)?));
    let sink = RotatingFileSink::new(base(&nested), "svc").with_clock(clock);

    assert_eq!(sink.write(b"{}\n")?, 3);
    assert_eq!(fs::read_to_string(nested.join("svc-2024-3-1.log"))?, "{}\n");
    fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn deleted_file_is_recreated_on_next_write() -> Result<()> {
    let harness = Harness::new("frame-log-deleted", at(2024, 3, 1, 10, 0)?);
    let path = harness.file("app-2024-3-1.log");

    harness.logger.info("first", &[]);
    fs::remove_file(&path)?;
    harness.logger.info("second", &[]);

    let records = read_lines(&path)?;
    assert_eq!(records.len(), 1);
    assert_eq!(
        records.first().and_then(|record| record.get("msg")),
        Some(&json!("second"))
    );
    Ok(())
}

#[test]
fn concurrent_writers_never_interleave() -> Result<()> {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let harness = Harness::new("frame-log-concurrent", at(2024, 3, 1, 10, 0)?);
    let logger = Arc::new(harness.logger.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for index in 0..PER_THREAD {
                    logger.info("tick", &[json!(worker), json!(index), json!("x".repeat(256))]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle
            .join()
            .map_err(|_| ErrorEnvelope::from(std::io::Error::other("writer thread panicked")))?;
    }

    let records = read_lines(&harness.file("app-2024-3-1.log"))?;
    assert_eq!(records.len(), THREADS * PER_THREAD);
    assert!(records.iter().all(|record| record.get("msg") == Some(&json!("tick"))));
    Ok(())
}

#[track_caller]
fn audit(logger: &dyn LoggerPort, what: &str) {
    logger.warn(what, &[]);
}

#[test]
fn track_caller_helpers_report_their_caller() -> Result<()> {
    let harness = Harness::new("frame-log-caller", at(2024, 3, 1, 10, 0)?);

    let line = line!() + 1;
    audit(&harness.logger, "through helper");
    harness.logger.log(LogEvent::new(
        LogLevel::Error,
        "explicit",
        vec![],
        CallerLocation::new("service/handler.rs", 7),
    ));

    let records = read_lines(&harness.file("app-2024-3-1.log"))?;
    let first = records.first();
    assert_eq!(first.and_then(|record| record.get("line")), Some(&json!(line)));
    assert_eq!(first.and_then(|record| record.get("file")), Some(&json!(file!())));
    let second = records.get(1);
    assert_eq!(
        second.and_then(|record| record.get("file")),
        Some(&json!("service/handler.rs"))
    );
    assert_eq!(second.and_then(|record| record.get("line")), Some(&json!(7)));
    Ok(())
}

#[test]
fn timestamps_follow_the_shared_clock() -> Result<()> {
    let harness = Harness::new("frame-log-ts", at(2024, 3, 1, 10, 0)?);

    harness.logger.debug("tick", &[]);

    let records = read_lines(&harness.file("app-2024-3-1.log"))?;
    let ts = records
        .first()
        .and_then(|record| record.get("ts"))
        .and_then(Value::as_str)
        .map(DateTime::parse_from_rfc3339);
    assert_eq!(
        ts.and_then(std::result::Result::ok),
        Some(harness.clock.now().fixed_offset())
    );
    Ok(())
}

fn dated_name(at: DateTime<Local>) -> String {
    format!("app-{}-{}-{}.log", at.year(), at.month(), at.day())
}

fn messages(path: &Path) -> Result<Vec<Value>> {
    Ok(read_lines(path)?
        .into_iter()
        .filter_map(|record| record.get("msg").cloned())
        .collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn each_write_lands_in_the_file_for_its_date(first in 0i64..400, second in 0i64..400) {
        let noon = at(2024, 1, 1, 12, 0).map_err(|error| TestCaseError::fail(error.to_string()))?;
        let first_at = noon + Duration::days(first);
        let second_at = noon + Duration::days(second);
        let harness = Harness::new("frame-log-dates", first_at);

        harness.logger.info("first", &[]);
        harness.clock.set(second_at);
        harness.logger.info("second", &[]);

        let read = |at: DateTime<Local>| {
            messages(&harness.file(&dated_name(at)))
                .map_err(|error| TestCaseError::fail(error.to_string()))
        };
        if first_at.date_naive() == second_at.date_naive() {
            prop_assert_eq!(read(first_at)?, vec![json!("first"), json!("second")]);
        } else {
            prop_assert_ne!(dated_name(first_at), dated_name(second_at));
            prop_assert_eq!(read(first_at)?, vec![json!("first")]);
            prop_assert_eq!(read(second_at)?, vec![json!("second")]);
        }
    }
}
