//! Shared CLI type definitions for turnstile build and runtime.
//!
//! This crate provides CLI argument types used by both the `build.rs` script
//! (for man page generation) and the runtime binary. Keeping them apart from
//! the library avoids pulling the whole runtime stack into the build script.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default directory holding the persisted key-value entries.
pub const DEFAULT_DATA_DIR: &str = ".turnstile";
/// Default simulated verification latency in milliseconds.
pub const DEFAULT_VERIFY_DELAY_MS: u64 = 900;
/// Default number of rows shown by the operator's quick log.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Configuration overrides accepted on the command line.
///
/// Unset fields are skipped during serialization so they do not mask values
/// coming from configuration files or the environment.
#[derive(Args, Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Directory holding the persisted store.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Simulated verification latency in milliseconds.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_delay_ms: Option<u64>,
}

/// Top-level CLI entry point consumed by binaries.
#[derive(Parser, Debug, Clone)]
#[command(name = "turnstile", author, version, about)]
pub struct Cli {
    /// CLI configuration overrides (merged with files and environment at runtime).
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands exposed by `turnstile`.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a demo session with one of the fixed profiles.
    Login(LoginArgs),
    /// End the current session.
    Logout,
    /// Show the current session.
    Whoami,
    /// Verify a single badge code.
    Verify(VerifyArgs),
    /// Read badge codes from standard input until end of input.
    Console,
    /// Show the most recent access records.
    Recent(RecentArgs),
    /// Manage users.
    #[command(subcommand)]
    Users(UsersCommand),
    /// List and export access records.
    Accesses(AccessesArgs),
    /// Show access reports.
    Reports(ReportsArgs),
    /// Show or edit settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Resolve a navigation path against the current session.
    Route(RouteArgs),
}

/// Demo profile selector.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRoleArg {
    /// Operator console profile.
    Operator,
    /// Administrator dashboard profile.
    Admin,
}

/// User role selector.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserRoleArg {
    /// Student.
    Student,
    /// Teaching staff.
    Teacher,
    /// Administrative staff.
    Administrative,
}

/// User status selector.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserStatusArg {
    /// Badge is accepted.
    Active,
    /// Badge is rejected.
    Inactive,
}

/// Access result selector used by filters.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultArg {
    /// Do not filter by result.
    #[default]
    All,
    /// Only allowed accesses.
    Allowed,
    /// Only denied accesses.
    Denied,
}

/// Arguments for `login`.
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Profile to log in as.
    #[arg(value_enum)]
    pub role: SessionRoleArg,
}

/// Arguments for `verify`.
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Code typed by the operator or read from the badge.
    #[arg(allow_hyphen_values = true, default_value = "")]
    pub code: String,
}

/// Arguments for `recent`.
#[derive(Args, Debug, Clone)]
pub struct RecentArgs {
    /// Number of records to show.
    #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
    pub limit: usize,
}

/// User management subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum UsersCommand {
    /// List all users.
    List,
    /// Add a user.
    Add(AddUserArgs),
    /// Edit an existing user.
    Edit(EditUserArgs),
    /// Remove a user.
    Remove(RemoveUserArgs),
}

/// Arguments for `users add`.
#[derive(Args, Debug, Clone)]
pub struct AddUserArgs {
    /// Identifier (badge code).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role of the user.
    #[arg(long, value_enum, default_value_t = UserRoleArg::Student)]
    pub role: UserRoleArg,
    /// Status of the user.
    #[arg(long, value_enum, default_value_t = UserStatusArg::Active)]
    pub status: UserStatusArg,
}

/// Arguments for `users edit`.
#[derive(Args, Debug, Clone)]
pub struct EditUserArgs {
    /// Identifier of the user to edit.
    pub id: String,
    /// New identifier.
    #[arg(long)]
    pub new_id: Option<String>,
    /// New display name.
    #[arg(long)]
    pub name: Option<String>,
    /// New role.
    #[arg(long, value_enum)]
    pub role: Option<UserRoleArg>,
    /// New status.
    #[arg(long, value_enum)]
    pub status: Option<UserStatusArg>,
}

/// Arguments for `users remove`.
#[derive(Args, Debug, Clone)]
pub struct RemoveUserArgs {
    /// Identifier of the user to remove.
    pub id: String,
    /// Skip the interactive confirmation.
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for `accesses`.
#[derive(Args, Debug, Clone, Default)]
pub struct AccessesArgs {
    /// Case-insensitive text matched against name and identifier.
    #[arg(long)]
    pub query: Option<String>,
    /// Result to keep.
    #[arg(long, value_enum, default_value_t = ResultArg::All)]
    pub result: ResultArg,
    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<String>,
    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<String>,
    /// Write the filtered records as CSV to this file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Arguments for `reports`.
#[derive(Args, Debug, Clone, Default)]
pub struct ReportsArgs {
    /// Write the allowed/denied summary as CSV to this file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Settings subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current settings.
    Show,
    /// Change one or more settings.
    Set(SetSettingsArgs),
}

/// Arguments for `settings set`.
#[derive(Args, Debug, Clone, Default)]
pub struct SetSettingsArgs {
    /// Force the turnstile state manually.
    #[arg(long)]
    pub manual_override: Option<bool>,
    /// Start of the allowed window (HH:MM).
    #[arg(long)]
    pub start: Option<String>,
    /// End of the allowed window (HH:MM).
    #[arg(long)]
    pub end: Option<String>,
}

/// Arguments for `route`.
#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Path to resolve, such as `/admin/users`.
    pub path: String,
}
