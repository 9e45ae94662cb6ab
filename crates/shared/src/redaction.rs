//! Keeping secrets out of output.
//!
//! Key names are matched against a fixed marker list; values under a
//! matching key are replaced in error metadata, printed config and log
//! records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

const SECRET_MARKERS: [&str; 6] = ["KEY", "TOKEN", "SECRET", "PASSWORD", "CREDENTIAL", "AUTH"];

/// True when a key or variable name looks like it holds a secret.
/// Matching ignores case.
///
/// ```
/// use frame_shared::is_secret_key;
///
/// assert!(is_secret_key("FRAME_MYSQL_PASSWORD"));
/// assert!(is_secret_key("apiKey"));
/// assert!(!is_secret_key("FRAME_LOG_PATH"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    SECRET_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// String that never prints its contents.
///
/// Loads from a plain string so passwords can live in config files.
/// `Debug`, `Display` and `Serialize` all write [`REDACTED`]; an empty
/// value serializes as `""` so "unset" stays visible.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SecretString(Box<str>);

impl SecretString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Self(value.into())
    }

    /// The raw value, for the few places that must use it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when unset.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if self.is_empty() { "" } else { REDACTED })
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
