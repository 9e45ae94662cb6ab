//! The workspace error type.
//!
//! Every failure is an [`ErrorEnvelope`]: a kind, a retry class, a stable
//! `namespace:code` and string metadata.

use crate::redaction::is_secret_key;
use serde::Serialize;
use std::collections::BTreeMap;
use std::{fmt, io};

/// String context attached to an error.
pub type ErrorMetadata = BTreeMap<String, String>;

/// Stored instead of metadata values under secret keys.
pub const REDACTED_VALUE: &str = "<redacted>";

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input or config the caller can fix.
    Expected,
    /// Broken internal assumption.
    Invariant,
    /// Environment failure: filesystem, database, serialization.
    Unexpected,
}

impl ErrorKind {
    /// Lowercase label used in rendered errors.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Invariant => "invariant",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether repeating the failed operation may succeed.
///
/// Nothing in the workspace retries on its own; the class is informational
/// for callers that layer their own policy on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Transient; a retry may succeed.
    Retriable,
    /// Permanent for the given input.
    NonRetriable,
}

impl ErrorClass {
    /// Label used in rendered errors.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retriable => "retriable",
            Self::NonRetriable => "non-retriable",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `namespace:code` pair identifying a failure, e.g. `log_sink:open_failed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Build a code from its two halves.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// `core:invalid_input`.
    pub fn invalid_input() -> Self {
        Self::new(CORE, "invalid_input")
    }

    /// `core:not_found`.
    pub fn not_found() -> Self {
        Self::new(CORE, "not_found")
    }

    /// `core:io`.
    pub fn io() -> Self {
        Self::new(CORE, "io")
    }

    /// Namespace half.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

const CORE: &str = "core";

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.code)
    }
}

/// Error value returned by every fallible operation in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// Origin category.
    pub kind: ErrorKind,
    /// Retry hint.
    pub class: ErrorClass,
    /// Stable identifier for matching in code and tests.
    pub code: ErrorCode,
    /// Message for humans.
    pub message: String,
    /// Context such as paths or env var names; secrets are already redacted.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    fn build(kind: ErrorKind, class: ErrorClass, code: ErrorCode, message: String) -> Self {
        Self {
            kind,
            class,
            code,
            message,
            metadata: ErrorMetadata::new(),
        }
    }

    /// Caller-fixable failure. Never retriable.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Expected, ErrorClass::NonRetriable, code, message.into())
    }

    /// Internal assumption broken. Never retriable.
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Invariant, ErrorClass::NonRetriable, code, message.into())
    }

    /// Environment failure with an explicit retry class.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self::build(ErrorKind::Unexpected, class, code, message.into())
    }

    /// Wrap an I/O failure under a caller-chosen code.
    ///
    /// The message is `"{context}: {error}"`; the retry class and the
    /// `io_kind` metadata entry are derived from the I/O error kind.
    pub fn wrap_io(code: ErrorCode, context: &str, error: &io::Error) -> Self {
        Self::unexpected(code, format!("{context}: {error}"), io_class(error.kind()))
            .with_metadata("io_kind", format!("{:?}", error.kind()))
    }

    /// Add one metadata entry.
    ///
    /// Values stored under secret-looking keys are replaced with
    /// [`REDACTED_VALUE`].
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = if is_secret_key(&key) {
            REDACTED_VALUE.to_string()
        } else {
            value.into()
        };
        self.metadata.insert(key, value);
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}: {}", self.kind, self.class, self.code, self.message)
    }
}

impl std::error::Error for ErrorEnvelope {}

impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        let kind = error.kind();
        let code = match kind {
            io::ErrorKind::NotFound => ErrorCode::not_found(),
            io::ErrorKind::PermissionDenied => ErrorCode::new(CORE, "permission_denied"),
            io::ErrorKind::TimedOut => ErrorCode::new(CORE, "timeout"),
            _ => ErrorCode::io(),
        };
        Self::unexpected(code, error.to_string(), io_class(kind))
            .with_metadata("io_kind", format!("{kind:?}"))
    }
}

const fn io_class(kind: io::ErrorKind) -> ErrorClass {
    match kind {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted => {
            ErrorClass::Retriable
        },
        _ => ErrorClass::NonRetriable,
    }
}
