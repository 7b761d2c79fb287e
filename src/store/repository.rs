//! Typed access to the persisted collections.

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::{
    ACCESSES_KEY,
    END_TIME_KEY,
    KeyValueStore,
    MANUAL_GATE_KEY,
    SESSION_KEY,
    START_TIME_KEY,
    StoreError,
    USERS_KEY,
};
use crate::{
    access_log::AccessLog,
    models::{AccessRecord, User},
    session::Session,
    settings::Settings,
};

/// Maps each collection onto its fixed key in a [`KeyValueStore`].
///
/// Reads never fail. An absent, `null` or malformed value yields the
/// caller's fallback; malformed values are logged at `warn`. Writes
/// propagate store errors.
#[derive(Debug)]
pub struct Repository<S> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    /// Wrap `store`.
    #[must_use]
    pub const fn new(store: S) -> Self { Self { store } }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &S { &self.store }

    fn read_raw(&self, key: &'static str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "store read failed; using fallback");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "malformed stored value; using fallback");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize { key, source })?;
        self.store.put(key, &raw)?;
        debug!(key, bytes = raw.len(), "stored value");
        Ok(())
    }

    /// Stored users, or `fallback` when none are usable.
    #[must_use]
    pub fn users(&self, fallback: &[User]) -> Vec<User> {
        self.read_json(USERS_KEY).unwrap_or_else(|| fallback.to_vec())
    }

    /// Replace the stored users.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the write fails.
    pub fn put_users(&self, users: &[User]) -> Result<(), StoreError> {
        self.write_json(USERS_KEY, users)
    }

    /// Stored access log, or `fallback` when none is usable. Either is
    /// truncated to the log capacity.
    #[must_use]
    pub fn accesses(&self, fallback: &[AccessRecord]) -> AccessLog {
        let records = self
            .read_json::<Vec<AccessRecord>>(ACCESSES_KEY)
            .unwrap_or_else(|| fallback.to_vec());
        AccessLog::from_records(records)
    }

    /// Replace the stored access log.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the write fails.
    pub fn put_accesses(&self, log: &AccessLog) -> Result<(), StoreError> {
        self.write_json(ACCESSES_KEY, log)
    }

    /// Stored settings, field by field, with defaults for anything missing.
    #[must_use]
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        let window = |key| {
            self.read_raw(key)
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty())
        };
        Settings {
            manual_override: self
                .read_json(MANUAL_GATE_KEY)
                .unwrap_or(defaults.manual_override),
            window_start: window(START_TIME_KEY).unwrap_or(defaults.window_start),
            window_end: window(END_TIME_KEY).unwrap_or(defaults.window_end),
        }
    }

    /// Write all three settings keys.
    ///
    /// # Errors
    /// Returns [`StoreError`] on the first failing write. Earlier keys stay
    /// written.
    pub fn put_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.write_json(MANUAL_GATE_KEY, &settings.manual_override)?;
        self.store.put(START_TIME_KEY, &settings.window_start)?;
        self.store.put(END_TIME_KEY, &settings.window_end)
    }

    /// Current session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> { self.read_json(SESSION_KEY) }

    /// Store `session`; `None` stores `null`.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the write fails.
    pub fn put_session(&self, session: Option<&Session>) -> Result<(), StoreError> {
        self.write_json(SESSION_KEY, &session)
    }
}
