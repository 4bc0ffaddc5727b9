//! SQLite storage for native hosts.
//!
//! # Responsibility
//! - Open file or in-memory connections for host-side preferences.
//! - Apply schema migrations before handing out a connection.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No preference is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Direction of a failed preference access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceOp {
    Read,
    Write,
}

impl Display for PreferenceOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

#[derive(Debug)]
pub enum DbError {
    /// Connecting to or migrating the preference database failed.
    Open(rusqlite::Error),
    /// One preference row could not be accessed.
    Preference {
        key: String,
        op: PreferenceOp,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    pub fn preference(key: &str, op: PreferenceOp, source: rusqlite::Error) -> Self {
        Self::Preference {
            key: key.to_string(),
            op,
            source,
        }
    }

    /// Preference key involved in the failure, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Preference { key, .. } => Some(key),
            Self::Open(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "preference database unavailable: {err}"),
            Self::Preference { key, op, source } => {
                write!(f, "preference `{key}` {op} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "preference schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Preference { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Open(value)
    }
}
