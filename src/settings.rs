//! Turnstile settings edited from the admin dashboard.
//!
//! The manual override flag and the allowed window are informational: no
//! component enforces them during verification.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default start of the allowed window.
pub const DEFAULT_WINDOW_START: &str = "07:00";
/// Default end of the allowed window.
pub const DEFAULT_WINDOW_END: &str = "19:00";

const TIME_FORMAT: &str = "%H:%M";

/// Errors raised while editing settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A window bound is not an `HH:MM` time of day.
    #[error("{field} must be a time of day as HH:MM, got '{value}'")]
    InvalidTime {
        /// Which bound failed.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
}

/// Persisted settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Manual open/close override.
    pub manual_override: bool,
    /// Start of the allowed window, `HH:MM`.
    pub window_start: String,
    /// End of the allowed window, `HH:MM`. Not required to follow the start.
    pub window_end: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manual_override: false,
            window_start: DEFAULT_WINDOW_START.to_owned(),
            window_end: DEFAULT_WINDOW_END.to_owned(),
        }
    }
}

/// Partial change to [`Settings`]; unset fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// New override flag.
    pub manual_override: Option<bool>,
    /// New window start.
    pub window_start: Option<String>,
    /// New window end.
    pub window_end: Option<String>,
}

/// Parse an `HH:MM` time of day.
///
/// # Errors
///
/// Returns [`SettingsError::InvalidTime`] tagged with `field` when `value`
/// does not parse.
pub fn parse_time_of_day(field: &'static str, value: &str) -> Result<NaiveTime, SettingsError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| SettingsError::InvalidTime {
        field,
        value: value.to_owned(),
    })
}

fn normalized(field: &'static str, value: &str) -> Result<String, SettingsError> {
    Ok(parse_time_of_day(field, value)?.format(TIME_FORMAT).to_string())
}

impl Settings {
    /// Settings with `update` applied.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if a new window bound is not a valid time.
    pub fn apply(&self, update: SettingsUpdate) -> Result<Self, SettingsError> {
        let window_start = match update.window_start {
            Some(value) => normalized("start", &value)?,
            None => self.window_start.clone(),
        };
        let window_end = match update.window_end {
            Some(value) => normalized("end", &value)?,
            None => self.window_end.clone(),
        };
        Ok(Self {
            manual_override: update.manual_override.unwrap_or(self.manual_override),
            window_start,
            window_end,
        })
    }
}
