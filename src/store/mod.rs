//! Key-value persistence for the turnstile state.
//!
//! This module tree exposes the [`KeyValueStore`] abstraction, a memory
//! backend, a directory-backed file backend, and the typed [`Repository`]
//! that maps each collection onto a fixed key.

mod file;
mod memory;
mod repository;

use thiserror::Error;

pub use self::{file::FileStore, memory::MemoryStore, repository::Repository};

/// Key holding the current session.
pub const SESSION_KEY: &str = "st_user";
/// Key holding the user collection.
pub const USERS_KEY: &str = "st_users";
/// Key holding the access-record collection.
pub const ACCESSES_KEY: &str = "st_accesses";
/// Key holding the manual override flag.
pub const MANUAL_GATE_KEY: &str = "st_manual_gate";
/// Key holding the allowed window start.
pub const START_TIME_KEY: &str = "st_start_time";
/// Key holding the allowed window end.
pub const END_TIME_KEY: &str = "st_end_time";

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Keys are limited to ASCII letters, digits, `_` and `-`.
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
    /// The store directory could not be created or opened.
    #[error("failed to open store at '{path}'")]
    Open {
        /// Directory that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading or writing an entry failed.
    #[error("store I/O failed for key '{key}'")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A value could not be serialized.
    #[error("failed to serialize value for key '{key}'")]
    Serialize {
        /// Key being written.
        key: &'static str,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed store of serialized values.
///
/// Writes are independent: there is no atomicity across keys.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the key is invalid or the backend fails.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the key is invalid or the backend fails.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value under `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the key is invalid or the backend fails.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> { (**self).get(key) }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> { (**self).put(key, value) }

    fn remove(&self, key: &str) -> Result<(), StoreError> { (**self).remove(key) }
}

pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}
