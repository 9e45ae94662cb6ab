//! SQLite-backed user repository.

use chrono::{DateTime, Utc};
use frame_domain::{NewUser, Page, User, UserId, UserStatus};
use frame_ports::UserRepositoryPort;
use frame_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result, ResultExt, SecretString};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Mutex;

const USER_COLUMNS: &str =
    "id, user_name, password, status, created_at_ms, updated_at_ms, deleted_at_ms";

/// User repository over a single SQLite connection.
#[derive(Debug)]
pub struct SqliteUserRepository {
    conn: Mutex<Connection>,
}

impl SqliteUserRepository {
    /// Open (or create) the database at `path` and ensure the `user` table.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| {
                ErrorEnvelope::wrap_io(
                    ErrorCode::new("user_repo", "mkdir_failed"),
                    "can't create database directory",
                    &error,
                )
                .with_metadata("path", parent.display().to_string())
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|error| repo_error("open_failed", "user database open failed", &error))
            .with_metadata("path", path.display().to_string())?;
        Self::with_connection(conn)
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|error| repo_error("open_failed", "user database open failed", &error))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_name TEXT NOT NULL,
                password TEXT NOT NULL,
                status INTEGER NOT NULL DEFAULT 2,
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL,
                deleted_at_ms INTEGER
             );
             CREATE INDEX IF NOT EXISTS idx_user_deleted_at ON user (deleted_at_ms);",
        )
        .map_err(|error| repo_error("schema_failed", "user schema setup failed", &error))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Soft-delete a user. Returns whether a visible row was marked.
    pub fn soft_delete(&self, id: UserId) -> Result<bool> {
        let conn = self.lock()?;
        let now = Utc::now().timestamp_millis();
        let changed = conn
            .execute(
                "UPDATE user SET deleted_at_ms = ?1, updated_at_ms = ?1
                 WHERE id = ?2 AND deleted_at_ms IS NULL",
                params![now, to_sql_id(id)?],
            )
            .map_err(|error| repo_error("delete_failed", "user delete failed", &error))?;
        Ok(changed > 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ErrorEnvelope::invariant(
                ErrorCode::new("user_repo", "lock_poisoned"),
                "user repository lock poisoned",
            )
        })
    }
}

impl UserRepositoryPort for SqliteUserRepository {
    fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {USER_COLUMNS} FROM user WHERE id = ?1 AND deleted_at_ms IS NULL"
                ),
                [to_sql_id(id)?],
                read_row,
            )
            .optional()
            .map_err(|error| repo_error("query_failed", "user query failed", &error))?;
        row.map(RawUser::into_user).transpose()
    }

    fn find_many(&self, name_fragment: &str, page: Page) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let offset = i64::try_from(page.offset()).map_err(|_| {
            ErrorEnvelope::expected(
                ErrorCode::new("user_repo", "offset_overflow"),
                "page offset too large",
            )
            .with_metadata("page", page.page().to_string())
        })?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM user
                 WHERE deleted_at_ms IS NULL AND instr(user_name, ?1) > 0
                 ORDER BY id
                 LIMIT ?2 OFFSET ?3"
            ))
            .map_err(|error| repo_error("query_failed", "user query failed", &error))?;
        let rows = stmt
            .query_map(
                params![name_fragment, i64::from(page.page_size()), offset],
                read_row,
            )
            .map_err(|error| repo_error("query_failed", "user query failed", &error))?;

        let mut users = Vec::new();
        for row in rows {
            let raw =
                row.map_err(|error| repo_error("query_failed", "user row read failed", &error))?;
            users.push(raw.into_user()?);
        }
        Ok(users)
    }

    fn insert(&self, user: NewUser) -> Result<User> {
        let conn = self.lock()?;
        let now = Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO user (user_name, password, status, created_at_ms, updated_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                user.user_name(),
                user.password().expose(),
                user.status().code(),
                now
            ],
        )
        .map_err(|error| repo_error("insert_failed", "user insert failed", &error))?;

        let raw = RawUser {
            id: conn.last_insert_rowid(),
            user_name: user.user_name().to_owned(),
            password: user.password().expose().to_owned(),
            status: user.status().code(),
            created_at_ms: now,
            updated_at_ms: now,
            deleted_at_ms: None,
        };
        raw.into_user()
    }
}

struct RawUser {
    id: i64,
    user_name: String,
    password: String,
    status: u32,
    created_at_ms: i64,
    updated_at_ms: i64,
    deleted_at_ms: Option<i64>,
}

impl RawUser {
    fn into_user(self) -> Result<User> {
        let id = u64::try_from(self.id).map_err(|_| corrupt_row("id", self.id))?;
        let status = UserStatus::new(self.status).map_err(ErrorEnvelope::from)?;
        Ok(User {
            id: UserId::new(id),
            user_name: self.user_name,
            password: SecretString::new(self.password),
            status,
            created_at: from_millis("created_at_ms", self.created_at_ms)?,
            updated_at: from_millis("updated_at_ms", self.updated_at_ms)?,
            deleted_at: self
                .deleted_at_ms
                .map(|ms| from_millis("deleted_at_ms", ms))
                .transpose()?,
        })
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        id: row.get(0)?,
        user_name: row.get(1)?,
        password: row.get(2)?,
        status: row.get(3)?,
        created_at_ms: row.get(4)?,
        updated_at_ms: row.get(5)?,
        deleted_at_ms: row.get(6)?,
    })
}

fn to_sql_id(id: UserId) -> Result<i64> {
    i64::try_from(id.get()).map_err(|_| {
        ErrorEnvelope::expected(ErrorCode::new("user_repo", "invalid_id"), "user id out of range")
            .with_metadata("id", id.to_string())
    })
}

fn from_millis(column: &str, ms: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| corrupt_row(column, ms))
}

fn corrupt_row(column: &str, value: i64) -> ErrorEnvelope {
    ErrorEnvelope::invariant(
        ErrorCode::new("user_repo", "corrupt_row"),
        "stored user row is out of range",
    )
    .with_metadata("column", column.to_string())
    .with_metadata("value", value.to_string())
}

fn repo_error(code: &str, context: &str, error: &rusqlite::Error) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("user_repo", code),
        format!("{context}: {error}"),
        ErrorClass::NonRetriable,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> Result<NewUser> {
        NewUser::new(name, "secret1", UserStatus::default()).map_err(ErrorEnvelope::from)
    }

    #[test]
    fn insert_then_get_round_trips_visible_fields() -> Result<()> {
        let repo = SqliteUserRepository::open_in_memory()?;
        let stored = repo.insert(new_user("alice")?)?;

        assert_eq!(stored.id, UserId::new(1));
        assert_eq!(stored.deleted_at, None);

        let fetched = repo.get_user(stored.id)?;
        assert_eq!(fetched.as_ref().map(|user| user.user_name.as_str()), Some("alice"));
        assert_eq!(
            fetched.as_ref().map(|user| user.password.expose()),
            Some("secret1")
        );
        assert_eq!(repo.get_user(UserId::new(99))?, None);
        Ok(())
    }

    #[test]
    fn find_many_matches_substring_in_id_order_with_paging() -> Result<()> {
        let repo = SqliteUserRepository::open_in_memory()?;
        for name in ["alice", "malik", "bobby", "alina"] {
            repo.insert(new_user(name)?)?;
        }

        let names = |users: Vec<User>| {
            users
                .into_iter()
                .map(|user| user.user_name)
                .collect::<Vec<_>>()
        };

        let all = repo.find_many("li", Page::new(1, 10).map_err(ErrorEnvelope::from)?)?;
        assert_eq!(names(all), vec!["alice", "malik", "alina"]);

        let second = repo.find_many("li", Page::new(2, 2).map_err(ErrorEnvelope::from)?)?;
        assert_eq!(names(second), vec!["alina"]);

        let everyone = repo.find_many("", Page::default())?;
        assert_eq!(everyone.len(), 4);
        Ok(())
    }

    #[test]
    fn percent_in_fragment_is_literal() -> Result<()> {
        let repo = SqliteUserRepository::open_in_memory()?;
        repo.insert(new_user("alice")?)?;
        assert!(repo.find_many("%", Page::default())?.is_empty());
        Ok(())
    }

    #[test]
    fn soft_deleted_rows_are_hidden() -> Result<()> {
        let repo = SqliteUserRepository::open_in_memory()?;
        let stored = repo.insert(new_user("alice")?)?;

        assert!(repo.soft_delete(stored.id)?);
        assert!(!repo.soft_delete(stored.id)?);
        assert_eq!(repo.get_user(stored.id)?, None);
        assert!(repo.find_many("alice", Page::default())?.is_empty());
        Ok(())
    }
}
