//! User entity and its validation rules.

use chrono::{DateTime, Utc};
use frame_shared::{ErrorCode, ErrorEnvelope, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

const USER_NAME_CHARS: RangeInclusive<usize> = 4..=12;
const PASSWORD_CHARS: RangeInclusive<usize> = 6..=120;
const MIN_STATUS: u32 = 2;

/// Row identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw row id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw row id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role code of a user. Codes below 2 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct UserStatus(u32);

impl UserStatus {
    /// Validate a raw role code.
    pub const fn new(code: u32) -> Result<Self, UserError> {
        if code < MIN_STATUS {
            return Err(UserError::StatusTooLow { code });
        }
        Ok(Self(code))
    }

    /// Raw role code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        Self(MIN_STATUS)
    }
}

impl TryFrom<u32> for UserStatus {
    type Error = UserError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<UserStatus> for u32 {
    fn from(status: UserStatus) -> Self {
        status.0
    }
}

/// A persisted user.
///
/// `password` is whatever the storage layer holds (normally a hash); it is
/// wrapped so that printing or logging a user never reveals it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Row id.
    pub id: UserId,
    /// Login name.
    pub user_name: String,
    /// Stored credential.
    pub password: SecretString,
    /// Role code.
    pub status: UserStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    user_name: String,
    password: SecretString,
    status: UserStatus,
}

impl NewUser {
    /// Validate user input.
    ///
    /// Lengths are counted in characters, not bytes.
    pub fn new(
        user_name: impl Into<String>,
        password: impl Into<SecretString>,
        status: UserStatus,
    ) -> Result<Self, UserError> {
        let user_name = user_name.into();
        let user_name = user_name.trim().to_owned();
        let name_len = user_name.chars().count();
        if !USER_NAME_CHARS.contains(&name_len) {
            return Err(UserError::UserNameLength { len: name_len });
        }

        let password = password.into();
        let password_len = password.expose().chars().count();
        if !PASSWORD_CHARS.contains(&password_len) {
            return Err(UserError::PasswordLength { len: password_len });
        }

        Ok(Self {
            user_name,
            password,
            status,
        })
    }

    /// Login name (trimmed).
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Credential to store.
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }

    /// Role code.
    #[must_use]
    pub const fn status(&self) -> UserStatus {
        self.status
    }
}

/// User validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserError {
    /// `user_name` is outside 4..=12 characters.
    #[error("user_name must be 4 to 12 characters (got {len})")]
    UserNameLength {
        /// Observed length in characters.
        len: usize,
    },
    /// `password` is outside 6..=120 characters.
    #[error("password must be 6 to 120 characters (got {len})")]
    PasswordLength {
        /// Observed length in characters.
        len: usize,
    },
    /// `status` is below the minimum role code.
    #[error("status must be at least 2 (got {code})")]
    StatusTooLow {
        /// Rejected code.
        code: u32,
    },
}

impl From<UserError> for ErrorEnvelope {
    fn from(error: UserError) -> Self {
        let message = error.to_string();
        match error {
            UserError::UserNameLength { len } => {
                Self::expected(ErrorCode::new("domain", "invalid_user_name"), message)
                    .with_metadata("len", len.to_string())
            },
            UserError::PasswordLength { len } => {
                Self::expected(ErrorCode::new("domain", "invalid_password"), message)
                    .with_metadata("len", len.to_string())
            },
            UserError::StatusTooLow { code } => {
                Self::expected(ErrorCode::new("domain", "invalid_status"), message)
                    .with_metadata("code", code.to_string())
            },
        }
    }
}
