//! Bundled seed data.
//!
//! The JSON files under `fixtures/` are compiled into the binary and used
//! whenever the persisted store has no usable value for a collection.

use thiserror::Error;

use crate::models::{AccessRecord, User};

const USERS_JSON: &str = include_str!("../fixtures/users.json");
const ACCESSES_JSON: &str = include_str!("../fixtures/accesses.json");

/// Errors raised while parsing fixture data.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The users fixture is not valid JSON for [`User`].
    #[error("invalid users fixture")]
    Users(#[source] serde_json::Error),
    /// The accesses fixture is not valid JSON for [`AccessRecord`].
    #[error("invalid accesses fixture")]
    Accesses(#[source] serde_json::Error),
}

/// Seed collections loaded once at start-up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fixtures {
    /// Seed users.
    pub users: Vec<User>,
    /// Seed access records, newest first.
    pub accesses: Vec<AccessRecord>,
}

impl Fixtures {
    /// Parse the fixtures bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] if a bundled file does not parse.
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_json(USERS_JSON, ACCESSES_JSON)
    }

    /// Parse fixtures from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] naming the collection that failed to parse.
    pub fn from_json(users: &str, accesses: &str) -> Result<Self, FixtureError> {
        Ok(Self {
            users: serde_json::from_str(users).map_err(FixtureError::Users)?,
            accesses: serde_json::from_str(accesses).map_err(FixtureError::Accesses)?,
        })
    }
}
