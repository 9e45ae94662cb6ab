//! Date-named log file sink.
//!
//! Each write lands in `<dir><prefix>-<year>-<month>-<day>.log` for the
//! current local date (month and day are not zero-padded). The directory
//! and file are created on demand. The file is re-checked on every write,
//! so a file removed between writes is recreated on the next one.
//!
//! One mutex covers the whole resolve-then-write sequence: records from
//! concurrent callers never interleave and rotation never races a write.

use crate::clock::{Clock, SystemClock};
use crate::log_sink::LogSink;
use chrono::{DateTime, Datelike, Duration, Local, NaiveTime};
use frame_ports::DEFAULT_ROTATION_WINDOW_DAYS;
use frame_shared::{ErrorCode, ErrorEnvelope, Result, ResultExt};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Rotating file sink.
pub struct RotatingFileSink {
    base_directory: Box<str>,
    file_prefix: Box<str>,
    window: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<RotationState>,
}

#[derive(Default)]
struct RotationState {
    window_start: Option<DateTime<Local>>,
    handle: Option<OpenLog>,
}

struct OpenLog {
    path: String,
    file: File,
}

impl RotatingFileSink {
    /// Sink writing under `base_directory` with the given file prefix.
    ///
    /// `base_directory` is joined by plain concatenation, so it should end
    /// with a path separator (`"./logs/"`).
    pub fn new(base_directory: impl Into<Box<str>>, file_prefix: impl Into<Box<str>>) -> Self {
        Self {
            base_directory: base_directory.into(),
            file_prefix: file_prefix.into(),
            window: Duration::days(i64::from(DEFAULT_ROTATION_WINDOW_DAYS)),
            clock: Arc::new(SystemClock),
            state: Mutex::new(RotationState::default()),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the rotation window.
    #[must_use]
    pub fn with_rotation_window_days(mut self, days: u32) -> Self {
        self.window = Duration::days(i64::from(days.max(1)));
        self
    }

    /// Path the next write would target.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.file_name(self.clock.now())
    }

    fn file_name(&self, now: DateTime<Local>) -> String {
        format!(
            "{}{}-{}-{}-{}.log",
            self.base_directory,
            self.file_prefix,
            now.year(),
            now.month(),
            now.day()
        )
    }

    /// Refresh the window when unset or expired. A refresh drops the cached
    /// handle so the next step re-opens from scratch.
    fn resolve_window(&self, state: &mut RotationState, now: DateTime<Local>) {
        let expired = state
            .window_start
            .is_none_or(|start| now.signed_duration_since(start) >= self.window);
        if expired {
            state.window_start = Some(local_midnight(now));
            state.handle = None;
        }
    }

    fn open_existing_or_new<'a>(
        &self,
        state: &'a mut RotationState,
        now: DateTime<Local>,
    ) -> Result<&'a mut File> {
        let path = self.file_name(now);

        match fs::metadata(&path) {
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&*self.base_directory).map_err(|error| {
                    sink_error(
                        "create_dir_failed",
                        "can't make directories for new logfile",
                        &error,
                    )
                    .with_metadata("path", self.base_directory.to_string())
                })?;
                let file = open_append(&path)?;
                // Absent at stat time, so start empty.
                file.set_len(0).map_err(|error| {
                    sink_error("open_failed", "can't open new logfile", &error)
                        .with_metadata("path", path.clone())
                })?;
                state.handle = Some(OpenLog { path, file });
            },
            _ => {
                let reusable = state
                    .handle
                    .as_ref()
                    .is_some_and(|handle| handle.path == path);
                if !reusable {
                    let file = open_append(&path)?;
                    state.handle = Some(OpenLog { path, file });
                }
            },
        }

        state.handle.as_mut().map(|handle| &mut handle.file).ok_or_else(|| {
            ErrorEnvelope::invariant(
                ErrorCode::new("log_sink", "missing_handle"),
                "log file handle missing after open",
            )
        })
    }
}

impl LogSink for RotatingFileSink {
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut state = self.state.lock().map_err(|_| {
            ErrorEnvelope::invariant(
                ErrorCode::new("log_sink", "lock_poisoned"),
                "rotating log sink lock poisoned",
            )
            .with_metadata("path", self.base_directory.to_string())
        })?;

        let now = self.clock.now();
        self.resolve_window(&mut state, now);
        let file = self.open_existing_or_new(&mut state, now)?;
        file.write_all(buf).map_err(|error| {
            sink_error("write_failed", "can't write logfile", &error)
                .with_metadata("path", self.file_name(now))
        })?;
        Ok(buf.len())
    }
}

fn open_append(path: &str) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| sink_error("open_failed", "can't open new logfile", &error))
        .with_metadata("path", path)
}

fn sink_error(code: &str, context: &str, error: &io::Error) -> ErrorEnvelope {
    ErrorEnvelope::wrap_io(ErrorCode::new("log_sink", code), context, error)
}

fn local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or(now)
}
