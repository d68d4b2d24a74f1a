//! Durable key-value storage contract and backends.
//!
//! # Responsibility
//! - Expose string-keyed slots with get/set/remove semantics.
//! - Deliver cross-context change signals to subscribers.
//!
//! # Invariants
//! - `get` never fails; unavailable or broken storage reads as absent.
//! - A context is never signalled about its own writes.
//! - A failed `set` leaves the stored value unchanged.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use crate::notify::Subscription;

/// Common browser per-origin budget.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub type StoreResult<T> = Result<T, StorageError>;

/// Write-path failures of a key-value backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is disabled in the host environment.
    Unavailable,
    /// The write would push total stored bytes past the quota.
    QuotaExceeded {
        key: String,
        bytes: usize,
        quota: usize,
    },
    /// A value could not be serialized before writing.
    Serialization(String),
    /// Underlying backend failure.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage is unavailable"),
            Self::QuotaExceeded { key, bytes, quota } => write!(
                f,
                "storage quota exceeded writing `{key}`: {bytes} bytes > {quota} bytes"
            ),
            Self::Serialization(message) => write!(f, "failed to serialize value: {message}"),
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
        }
    }
}

impl Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

/// Key-value slots scoped to one execution context (one tab, one connection).
pub trait KeyValueStore {
    /// Returns the stored value, or `None` if unset or storage is unavailable.
    fn get(&self, key: &str) -> Option<String>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes `key`; deleting an unset key is a no-op.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Registers a handler for keys changed by *other* contexts.
    fn subscribe_external(&self, handler: Box<dyn Fn(&str)>) -> Subscription;

    /// Delivers pending cross-context signals; returns how many keys fired.
    fn dispatch_external_changes(&self) -> usize;
}

pub(crate) fn entry_bytes(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
