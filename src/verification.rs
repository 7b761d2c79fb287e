//! Badge lookup policy.
//!
//! Verification never fails: an unknown or empty code is a defined denied
//! outcome carrying sentinel values instead of the user's details.

use chrono::{DateTime, Utc};

use crate::models::{AccessRecord, AccessResult, User};

/// Name recorded when no user matches the code.
pub const UNKNOWN_USER_NAME: &str = "Unknown user";
/// Identifier recorded when the trimmed code is empty.
pub const UNKNOWN_USER_ID: &str = "UNKNOWN";

/// Terminal state of one verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Known user with an active badge.
    Allowed,
    /// Known user with an inactive badge.
    Denied,
    /// No user matches the code. Recorded as denied.
    NotFound,
}

impl Outcome {
    /// Result written to the access record.
    #[must_use]
    pub const fn result(self) -> AccessResult {
        match self {
            Self::Allowed => AccessResult::Allowed,
            Self::Denied | Self::NotFound => AccessResult::Denied,
        }
    }
}

/// Everything produced by one verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verification {
    /// How the attempt resolved.
    pub outcome: Outcome,
    /// Record to append to the access log.
    pub record: AccessRecord,
    /// Matched user, if any.
    pub user: Option<User>,
}

/// Find the user whose id equals `code` after trimming, ignoring case.
#[must_use]
pub fn find_user<'a>(users: &'a [User], code: &str) -> Option<&'a User> {
    let wanted = code.trim();
    if wanted.is_empty() {
        return None;
    }
    users.iter().find(|user| user.has_id(wanted))
}

/// Resolve `code` against `users` at time `at`.
#[must_use]
pub fn verify(users: &[User], code: &str, at: DateTime<Utc>) -> Verification {
    let Some(user) = find_user(users, code) else {
        let trimmed = code.trim();
        let user_id = if trimmed.is_empty() {
            UNKNOWN_USER_ID
        } else {
            trimmed
        };
        return Verification {
            outcome: Outcome::NotFound,
            record: AccessRecord {
                user_id: user_id.to_owned(),
                name: UNKNOWN_USER_NAME.to_owned(),
                role: None,
                datetime: at,
                result: AccessResult::Denied,
            },
            user: None,
        };
    };

    let outcome = if user.is_active() {
        Outcome::Allowed
    } else {
        Outcome::Denied
    };
    Verification {
        outcome,
        record: AccessRecord {
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: Some(user.role),
            datetime: at,
            result: outcome.result(),
        },
        user: Some(user.clone()),
    }
}
