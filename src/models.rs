//! Domain records shared by the store, the verification flow and the reports.
//!
//! Enumerations serialize with their English names. The Spanish labels used
//! by earlier deployments of the demo are accepted when reading stored data.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role shown in place of a real one when the badge owner is unknown.
pub const PLACEHOLDER_ROLE: &str = "-";

/// Campus role of a badge holder.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Enrolled student.
    #[serde(alias = "Estudiante")]
    Student,
    /// Teaching staff.
    #[serde(alias = "Profesor")]
    Teacher,
    /// Administrative staff.
    #[serde(alias = "Administrativo")]
    Administrative,
}

/// Whether a badge is currently accepted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserStatus {
    /// Badge opens the turnstile.
    #[serde(alias = "Activo")]
    Active,
    /// Badge is rejected.
    #[serde(alias = "Inactivo")]
    Inactive,
}

/// Outcome stored on an access record.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessResult {
    /// The turnstile opened.
    #[serde(alias = "Permitido")]
    Allowed,
    /// The turnstile stayed closed.
    #[serde(alias = "Denegado")]
    Denied,
}

/// Error returned when a label does not name a known variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{label}'")]
pub struct UnknownLabel {
    kind: &'static str,
    label: String,
}

impl Role {
    /// English label used for display and serialization.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::Administrative => "Administrative",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" | "Estudiante" => Ok(Self::Student),
            "Teacher" | "Profesor" => Ok(Self::Teacher),
            "Administrative" | "Administrativo" => Ok(Self::Administrative),
            other => Err(UnknownLabel {
                kind: "role",
                label: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl UserStatus {
    /// English label used for display and serialization.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl AccessResult {
    /// English label used for display and serialization.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Allowed => "Allowed",
            Self::Denied => "Denied",
        }
    }
}

impl fmt::Display for AccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// A badge holder known to the turnstile.
///
/// Identity is the `id`; two users never share an id, compared
/// case-insensitively.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Badge code.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Campus role.
    pub role: Role,
    /// Whether the badge is accepted.
    pub status: UserStatus,
    /// Last time the badge opened the turnstile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_access: Option<DateTime<Utc>>,
}

impl User {
    /// Build a user that has never passed the turnstile.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role, status: UserStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            status,
            last_access: None,
        }
    }

    /// Whether verification of this user's badge succeeds.
    #[must_use]
    pub fn is_active(&self) -> bool { self.status == UserStatus::Active }

    /// Case-insensitive identifier comparison.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool { self.id.to_lowercase() == id.to_lowercase() }
}

/// One verification attempt and its outcome. Never modified after creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccessRecord {
    /// Badge code as recorded.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Name of the badge owner, or the unknown-user sentinel.
    pub name: String,
    /// Role of the badge owner; `None` when the badge is unknown.
    #[serde(with = "record_role")]
    pub role: Option<Role>,
    /// When the attempt resolved.
    pub datetime: DateTime<Utc>,
    /// Whether the turnstile opened.
    pub result: AccessResult,
}

impl AccessRecord {
    /// Role label as shown in listings and exports.
    #[must_use]
    pub fn role_label(&self) -> &'static str { self.role.map_or(PLACEHOLDER_ROLE, Role::label) }
}

mod record_role {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

    use super::{PLACEHOLDER_ROLE, Role};

    pub fn serialize<S: Serializer>(role: &Option<Role>, serializer: S) -> Result<S::Ok, S::Error> {
        match role {
            Some(known) => known.serialize(serializer),
            None => serializer.serialize_str(PLACEHOLDER_ROLE),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
        let label = String::deserialize(deserializer)?;
        if label == PLACEHOLDER_ROLE {
            return Ok(None);
        }
        label.parse().map(Some).map_err(D::Error::custom)
    }
}
