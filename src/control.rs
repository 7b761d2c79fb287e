//! In-memory access-control state with write-through persistence.
//!
//! [`AccessControl`] owns the user collection, the access log and the
//! settings. Every mutation serializes the next value to the store first
//! and commits it to memory only when that write succeeds, so memory and
//! store never disagree after an error.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    access_log::AccessLog,
    fixtures::Fixtures,
    models::User,
    session::{Session, SessionRole},
    settings::{Settings, SettingsError, SettingsUpdate},
    store::{KeyValueStore, Repository, StoreError},
    users::{self, UserError},
    verification::{self, Outcome, Verification},
};

/// Errors surfaced by [`AccessControl`] operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Persisting a change failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A user edit was rejected.
    #[error(transparent)]
    User(#[from] UserError),
    /// A settings edit was rejected.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Users, access log and settings backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct AccessControl<S> {
    repo: Repository<S>,
    users: Vec<User>,
    accesses: AccessLog,
    settings: Settings,
}

impl<S: KeyValueStore> AccessControl<S> {
    /// Load state from `store`, using `fixtures` for any collection the
    /// store cannot provide.
    #[must_use]
    pub fn load(store: S, fixtures: &Fixtures) -> Self {
        let repo = Repository::new(store);
        let users = repo.users(&fixtures.users);
        let accesses = repo.accesses(&fixtures.accesses);
        let settings = repo.settings();
        debug!(
            users = users.len(),
            accesses = accesses.len(),
            "loaded access-control state"
        );
        Self {
            repo,
            users,
            accesses,
            settings,
        }
    }

    /// Typed view of the backing store.
    #[must_use]
    pub const fn repository(&self) -> &Repository<S> { &self.repo }

    /// All users in display order.
    #[must_use]
    pub fn users(&self) -> &[User] { &self.users }

    /// User holding `id`, compared case-insensitively.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<&User> { verification::find_user(&self.users, id) }

    /// Access log, newest first.
    #[must_use]
    pub const fn accesses(&self) -> &AccessLog { &self.accesses }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings { &self.settings }

    fn commit_users(&mut self, next: Vec<User>) -> Result<(), ControlError> {
        self.repo.put_users(&next)?;
        self.users = next;
        Ok(())
    }

    /// Add `user` at the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::User`] if the user is rejected, or
    /// [`ControlError::Store`] if persisting fails.
    pub fn add_user(&mut self, user: User) -> Result<(), ControlError> {
        let next = users::with_added(&self.users, user)?;
        self.commit_users(next)?;
        info!(total = self.users.len(), "user added");
        Ok(())
    }

    /// Replace the user holding `id` with `user`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::User`] if the edit is rejected, or
    /// [`ControlError::Store`] if persisting fails.
    pub fn update_user(&mut self, id: &str, user: User) -> Result<(), ControlError> {
        let next = users::with_updated(&self.users, id, user)?;
        self.commit_users(next)?;
        info!(id, "user updated");
        Ok(())
    }

    /// Remove the user holding `id`. Access records are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::User`] if nobody holds `id`, or
    /// [`ControlError::Store`] if persisting fails.
    pub fn remove_user(&mut self, id: &str) -> Result<(), ControlError> {
        let next = users::without(&self.users, id)?;
        self.commit_users(next)?;
        info!(id, "user removed");
        Ok(())
    }

    /// Verify `code` at time `at` and append the resulting record.
    ///
    /// An allowed verification also stamps the user's last access. Once the
    /// record is stored the outcome stands: a failed stamp is logged and
    /// leaves the in-memory users unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Store`] if persisting the record fails. The
    /// log is left unchanged.
    pub fn verify(&mut self, code: &str, at: DateTime<Utc>) -> Result<Verification, ControlError> {
        let verification = verification::verify(&self.users, code, at);
        let next_log = self.accesses.with(verification.record.clone());
        self.repo.put_accesses(&next_log)?;
        self.accesses = next_log;
        info!(
            user_id = %verification.record.user_id,
            outcome = ?verification.outcome,
            "verification recorded"
        );

        if verification.outcome == Outcome::Allowed {
            let stamped = stamp_last_access(&self.users, &verification.record.user_id, at);
            if let Err(e) = self.commit_users(stamped) {
                warn!(
                    user_id = %verification.record.user_id,
                    error = %e,
                    "last access could not be recorded"
                );
            }
        }
        Ok(verification)
    }

    /// Apply `update` to the settings and persist all three keys.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Settings`] for an invalid time, or
    /// [`ControlError::Store`] if persisting fails.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<&Settings, ControlError> {
        let next = self.settings.apply(update)?;
        self.repo.put_settings(&next)?;
        self.settings = next;
        info!(
            manual_override = self.settings.manual_override,
            start = %self.settings.window_start,
            end = %self.settings.window_end,
            "settings updated"
        );
        Ok(&self.settings)
    }

    /// Stored session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> { self.repo.session() }

    /// Store the demo profile for `role` as the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Store`] if persisting fails.
    pub fn login(&self, role: SessionRole) -> Result<Session, ControlError> {
        let session = Session::demo(role);
        self.repo.put_session(Some(&session))?;
        info!(username = %session.username, "logged in");
        Ok(session)
    }

    /// Clear the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Store`] if persisting fails.
    pub fn logout(&self) -> Result<(), ControlError> {
        self.repo.put_session(None)?;
        info!("logged out");
        Ok(())
    }
}

/// Copy of `users` with `last_access` set to `at` for the holder of `id`.
fn stamp_last_access(users: &[User], id: &str, at: DateTime<Utc>) -> Vec<User> {
    users
        .iter()
        .map(|user| {
            let mut stamped = user.clone();
            if stamped.id == id {
                stamped.last_access = Some(at);
            }
            stamped
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "test assertions")]

    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{
        access_log::ACCESS_LOG_CAPACITY,
        models::{AccessResult, Role, UserStatus},
        store::{MemoryStore, USERS_KEY},
        verification::UNKNOWN_USER_NAME,
    };

    /// Store whose writes always fail.
    #[derive(Debug, Default)]
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> { self.0.get(key) }

        fn put(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_owned(),
                source: std::io::Error::other("read-only"),
            })
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> { self.0.remove(key) }
    }

    /// Store that refuses writes to the users key only.
    #[derive(Debug, Default)]
    struct UsersReadOnlyStore(MemoryStore);

    impl KeyValueStore for UsersReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> { self.0.get(key) }

        fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == USERS_KEY {
                return Err(StoreError::Io {
                    key: key.to_owned(),
                    source: std::io::Error::other("read-only"),
                });
            }
            self.0.put(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> { self.0.remove(key) }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0)
            .single()
            .expect("valid time")
    }

    #[fixture]
    fn fixtures() -> Fixtures {
        Fixtures {
            users: vec![
                User::new("U001", "Ana", Role::Student, UserStatus::Active),
                User::new("U002", "Carlos", Role::Student, UserStatus::Inactive),
            ],
            accesses: Vec::new(),
        }
    }

    #[fixture]
    fn control(fixtures: Fixtures) -> AccessControl<MemoryStore> {
        AccessControl::load(MemoryStore::new(), &fixtures)
    }

    #[rstest]
    fn active_user_is_allowed_and_stamped(mut control: AccessControl<MemoryStore>) {
        let v = control.verify(" u001 ", at()).expect("verify");
        assert_eq!(v.outcome, Outcome::Allowed);
        assert_eq!(control.accesses().len(), 1);
        assert_eq!(control.accesses().front(), Some(&v.record));
        assert_eq!(control.user("U001").and_then(|u| u.last_access), Some(at()));
        assert_eq!(control.repository().users(&[]), control.users());
    }

    #[rstest]
    fn inactive_user_is_denied_without_stamp(mut control: AccessControl<MemoryStore>) {
        let v = control.verify("U002", at()).expect("verify");
        assert_eq!(v.record.result, AccessResult::Denied);
        assert_eq!(control.user("U002").and_then(|u| u.last_access), None);
    }

    #[rstest]
    fn unknown_code_is_logged(mut control: AccessControl<MemoryStore>) {
        let v = control.verify("ZZZ", at()).expect("verify");
        assert_eq!(v.outcome, Outcome::NotFound);
        assert_eq!(v.record.name, UNKNOWN_USER_NAME);
        assert_eq!(control.repository().accesses(&[]).front(), Some(&v.record));
    }

    #[rstest]
    fn log_stays_capped(mut control: AccessControl<MemoryStore>) {
        for _ in 0..ACCESS_LOG_CAPACITY + 5 {
            control.verify("U001", at()).expect("verify");
        }
        assert_eq!(control.accesses().len(), ACCESS_LOG_CAPACITY);
        assert_eq!(control.repository().accesses(&[]).len(), ACCESS_LOG_CAPACITY);
    }

    #[rstest]
    fn rejected_add_leaves_store_untouched(mut control: AccessControl<MemoryStore>) {
        let err = control
            .add_user(User::new("", "Nobody", Role::Student, UserStatus::Active))
            .expect_err("must fail");
        assert!(matches!(err, ControlError::User(UserError::MissingField("id"))));
        assert_eq!(control.repository().store().get(USERS_KEY).expect("get"), None);
        assert_eq!(control.users().len(), 2);
    }

    #[rstest]
    fn user_edits_write_through(mut control: AccessControl<MemoryStore>) {
        control
            .add_user(User::new("N1", "Nora", Role::Teacher, UserStatus::Active))
            .expect("add");
        control
            .update_user("N1", User::new("N1", "Nora B", Role::Teacher, UserStatus::Inactive))
            .expect("update");
        control.remove_user("U002").expect("remove");
        let stored = control.repository().users(&[]);
        assert_eq!(stored, control.users());
        assert_eq!(
            stored.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(),
            ["N1", "U001"]
        );
    }

    #[rstest]
    fn removing_user_keeps_records(mut control: AccessControl<MemoryStore>) {
        control.verify("U001", at()).expect("verify");
        control.remove_user("U001").expect("remove");
        assert_eq!(control.accesses().len(), 1);
    }

    #[rstest]
    fn failed_write_keeps_memory(fixtures: Fixtures) {
        let mut control = AccessControl::load(ReadOnlyStore::default(), &fixtures);
        assert!(matches!(
            control.verify("U001", at()),
            Err(ControlError::Store(_))
        ));
        assert!(control.accesses().is_empty());
        assert!(control.remove_user("U001").is_err());
        assert_eq!(control.users().len(), 2);
    }

    #[rstest]
    fn failed_stamp_keeps_recorded_outcome(fixtures: Fixtures) {
        let mut control = AccessControl::load(UsersReadOnlyStore::default(), &fixtures);
        let v = control.verify("U001", at()).expect("outcome recorded");
        assert_eq!(v.outcome, Outcome::Allowed);
        assert_eq!(control.accesses().front(), Some(&v.record));
        assert_eq!(control.repository().accesses(&[]).front(), Some(&v.record));
        assert_eq!(control.user("U001").and_then(|u| u.last_access), None);
    }

    #[rstest]
    fn settings_update_persists(mut control: AccessControl<MemoryStore>) {
        control
            .update_settings(SettingsUpdate {
                manual_override: Some(true),
                window_start: Some("06:05".to_owned()),
                window_end: None,
            })
            .expect("update");
        let stored = control.repository().settings();
        assert!(stored.manual_override);
        assert_eq!(stored.window_start, "06:05");
        assert_eq!(stored.window_end, "19:00");
    }

    #[rstest]
    fn invalid_settings_are_rejected(mut control: AccessControl<MemoryStore>) {
        let err = control
            .update_settings(SettingsUpdate {
                window_end: Some("25:99".to_owned()),
                ..SettingsUpdate::default()
            })
            .expect_err("must fail");
        assert!(matches!(err, ControlError::Settings(_)));
        assert_eq!(control.settings(), &Settings::default());
    }

    #[rstest]
    fn login_and_logout(control: AccessControl<MemoryStore>) {
        let session = control.login(SessionRole::Admin).expect("login");
        assert_eq!(control.session(), Some(session));
        control.logout().expect("logout");
        assert_eq!(control.session(), None);
    }
}
