//! User collection edits.
//!
//! Each operation returns the next collection instead of mutating in place,
//! so callers can persist it before committing it.

use thiserror::Error;

use crate::models::User;

/// Errors raised by user edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// A required field was empty after trimming.
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    /// Another user already holds this id.
    #[error("a user with id '{0}' already exists")]
    DuplicateId(String),
    /// No user holds this id.
    #[error("no user with id '{0}'")]
    UnknownUser(String),
}

/// Trim `user`'s id and name and check that both are present.
///
/// # Errors
///
/// Returns [`UserError::MissingField`] naming the first empty field.
pub fn validate(mut user: User) -> Result<User, UserError> {
    user.id = user.id.trim().to_owned();
    user.name = user.name.trim().to_owned();
    if user.id.is_empty() {
        return Err(UserError::MissingField("id"));
    }
    if user.name.is_empty() {
        return Err(UserError::MissingField("name"));
    }
    Ok(user)
}

fn holder<'a>(users: &'a [User], id: &str) -> Option<&'a User> { users.iter().find(|u| u.has_id(id)) }

/// `users` with `user` prepended.
///
/// # Errors
///
/// Returns [`UserError`] if `user` is invalid or its id is taken.
pub fn with_added(users: &[User], user: User) -> Result<Vec<User>, UserError> {
    let added = validate(user)?;
    if let Some(existing) = holder(users, &added.id) {
        return Err(UserError::DuplicateId(existing.id.clone()));
    }
    let mut next = Vec::with_capacity(users.len() + 1);
    next.push(added);
    next.extend_from_slice(users);
    Ok(next)
}

/// `users` with the user identified by `id` replaced by `user`, in place.
///
/// # Errors
///
/// Returns [`UserError::UnknownUser`] if nobody holds `id`, or another
/// [`UserError`] if `user` is invalid or would take someone else's id.
pub fn with_updated(users: &[User], id: &str, user: User) -> Result<Vec<User>, UserError> {
    let target = id.trim();
    if holder(users, target).is_none() {
        return Err(UserError::UnknownUser(target.to_owned()));
    }
    let updated = validate(user)?;
    if let Some(other) = users.iter().find(|u| u.has_id(&updated.id) && !u.has_id(target)) {
        return Err(UserError::DuplicateId(other.id.clone()));
    }
    Ok(users
        .iter()
        .map(|u| if u.has_id(target) { updated.clone() } else { u.clone() })
        .collect())
}

/// `users` without the user identified by `id`.
///
/// # Errors
///
/// Returns [`UserError::UnknownUser`] if nobody holds `id`.
pub fn without(users: &[User], id: &str) -> Result<Vec<User>, UserError> {
    let target = id.trim();
    if holder(users, target).is_none() {
        return Err(UserError::UnknownUser(target.to_owned()));
    }
    Ok(users.iter().filter(|u| !u.has_id(target)).cloned().collect())
}
