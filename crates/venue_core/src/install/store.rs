//! Dismissal timestamp persistence.
//!
//! # Responsibility
//! - Define the storage seam for the banner dismissal timestamp.
//! - Own the eligibility rule derived from that timestamp.
//!
//! # Invariants
//! - The timestamp is stored as a decimal millisecond epoch string.
//! - Records are overwritten on dismissal and never deleted.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[cfg(not(target_arch = "wasm32"))]
use crate::db::DbError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure for the dismissal record.
#[derive(Debug)]
pub enum StoreError {
    /// Backend rejected the read/write (quota, privacy mode, ...).
    Backend(String),
    /// Stored value is not a millisecond timestamp.
    InvalidTimestamp(String),
    #[cfg(not(target_arch = "wasm32"))]
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(details) => write!(f, "dismissal storage failed: {details}"),
            Self::InvalidTimestamp(raw) => {
                write!(f, "stored dismissal timestamp is invalid: `{raw}`")
            }
            #[cfg(not(target_arch = "wasm32"))]
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Storage seam for the last banner dismissal.
pub trait DismissalStore {
    /// Returns the last dismissal time in epoch milliseconds, if any.
    fn load_dismissed_at(&self) -> StoreResult<Option<i64>>;
    /// Overwrites the dismissal time.
    fn save_dismissed_at(&mut self, epoch_ms: i64) -> StoreResult<()>;
}

/// Parses a stored timestamp string.
pub fn parse_timestamp(raw: &str) -> StoreResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| StoreError::InvalidTimestamp(raw.to_string()))
}

pub fn format_timestamp(epoch_ms: i64) -> String {
    epoch_ms.to_string()
}

/// Banner eligibility rule.
///
/// Eligible when no dismissal exists or the dismissal is strictly older than
/// `window_ms`.
pub fn is_banner_eligible(dismissed_at: Option<i64>, now_ms: i64, window_ms: i64) -> bool {
    match dismissed_at {
        None => true,
        Some(dismissed_at) => now_ms.saturating_sub(dismissed_at) > window_ms,
    }
}

/// Process-local store; holds the raw string like browser storage does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDismissalStore {
    raw: Option<String>,
}

impl MemoryDismissalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismissed_at(epoch_ms: i64) -> Self {
        Self {
            raw: Some(format_timestamp(epoch_ms)),
        }
    }

    /// Store pre-seeded with an arbitrary raw value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl DismissalStore for MemoryDismissalStore {
    fn load_dismissed_at(&self) -> StoreResult<Option<i64>> {
        self.raw.as_deref().map(parse_timestamp).transpose()
    }

    fn save_dismissed_at(&mut self, epoch_ms: i64) -> StoreResult<()> {
        self.raw = Some(format_timestamp(epoch_ms));
        Ok(())
    }
}
