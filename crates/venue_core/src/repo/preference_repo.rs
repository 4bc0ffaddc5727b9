//! Host preference repository and SQLite dismissal store.
//!
//! # Responsibility
//! - Persist small string preferences keyed by name.
//! - Back the install banner's `DismissalStore` on native hosts.
//!
//! # Invariants
//! - `set` overwrites; rows are never deleted.
//! - Values are stored exactly as browser storage would hold them.

use crate::db::{DbError, PreferenceOp};
use crate::install::store::{format_timestamp, parse_timestamp, DismissalStore, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key/value preference access.
pub trait PreferenceRepository {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// SQLite-backed preferences over a migrated connection.
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| DbError::preference(key, PreferenceOp::Read, err))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO preferences (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(|err| DbError::preference(key, PreferenceOp::Write, err))?;
        Ok(())
    }
}

/// `DismissalStore` persisting under one preference key.
pub struct SqliteDismissalStore<'conn> {
    repo: SqlitePreferenceRepository<'conn>,
    key: String,
}

impl<'conn> SqliteDismissalStore<'conn> {
    pub fn new(conn: &'conn Connection, key: impl Into<String>) -> Self {
        Self {
            repo: SqlitePreferenceRepository::new(conn),
            key: key.into(),
        }
    }
}

impl DismissalStore for SqliteDismissalStore<'_> {
    fn load_dismissed_at(&self) -> StoreResult<Option<i64>> {
        self.repo
            .get(&self.key)?
            .as_deref()
            .map(parse_timestamp)
            .transpose()
    }

    fn save_dismissed_at(&mut self, epoch_ms: i64) -> StoreResult<()> {
        self.repo.set(&self.key, &format_timestamp(epoch_ms))
    }
}
