//! Demo session profiles.
//!
//! There are no credentials: logging in picks one of two fixed profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::privileges::Privileges;

/// Role of the logged-in console user.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionRole {
    /// Runs the operator console.
    Operator,
    /// Runs the admin dashboard.
    Admin,
}

impl SessionRole {
    /// Privileges granted to this role.
    #[must_use]
    pub const fn privileges(self) -> Privileges {
        match self {
            Self::Operator => Privileges::operator(),
            Self::Admin => Privileges::admin(),
        }
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Operator => "operator",
            Self::Admin => "admin",
        })
    }
}

/// Current logged-in identity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Login name.
    pub username: String,
    /// Selected role.
    pub role: SessionRole,
    /// Display name.
    pub name: String,
}

impl Session {
    /// The fixed demo profile for `role`.
    #[must_use]
    pub fn demo(role: SessionRole) -> Self {
        let (username, name) = match role {
            SessionRole::Operator => ("operator.utb", "Operator"),
            SessionRole::Admin => ("admin.utb", "Administrator"),
        };
        Self {
            username: username.to_owned(),
            role,
            name: name.to_owned(),
        }
    }

    /// Whether this session holds every privilege in `required`.
    #[must_use]
    pub const fn can(&self, required: Privileges) -> bool {
        self.role.privileges().contains(required)
    }
}
