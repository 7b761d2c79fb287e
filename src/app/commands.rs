//! Handlers for each CLI command.
//!
//! Handlers write human-readable output to the supplied writer and read
//! confirmations or badge codes from the supplied async input.

use std::{io::Write, path::Path, pin::Pin, sync::Arc};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use cli_defs::{
    AccessesArgs,
    AddUserArgs,
    Commands,
    EditUserArgs,
    ReportsArgs,
    ResultArg,
    SessionRoleArg,
    SetSettingsArgs,
    SettingsCommand,
    UserRoleArg,
    UserStatusArg,
    UsersCommand,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::Mutex,
};
use tracing::{debug, info};

use super::config::AppConfig;
use crate::{
    console::{ConsoleError, OperatorConsole},
    control::AccessControl,
    export::{self, DATE_FORMAT},
    filter::{AccessFilter, ResultFilter},
    models::{AccessRecord, Role, User, UserStatus},
    navigation,
    privileges::Privileges,
    reports::Report,
    session::{Session, SessionRole},
    settings::{Settings, SettingsUpdate},
    store::KeyValueStore,
    verification::{Outcome, Verification},
};

const QUIT_WORDS: [&str; 2] = ["quit", "exit"];

impl From<SessionRoleArg> for SessionRole {
    fn from(arg: SessionRoleArg) -> Self {
        match arg {
            SessionRoleArg::Operator => Self::Operator,
            SessionRoleArg::Admin => Self::Admin,
        }
    }
}

impl From<UserRoleArg> for Role {
    fn from(arg: UserRoleArg) -> Self {
        match arg {
            UserRoleArg::Student => Self::Student,
            UserRoleArg::Teacher => Self::Teacher,
            UserRoleArg::Administrative => Self::Administrative,
        }
    }
}

impl From<UserStatusArg> for UserStatus {
    fn from(arg: UserStatusArg) -> Self {
        match arg {
            UserStatusArg::Active => Self::Active,
            UserStatusArg::Inactive => Self::Inactive,
        }
    }
}

impl From<ResultArg> for ResultFilter {
    fn from(arg: ResultArg) -> Self {
        match arg {
            ResultArg::All => Self::All,
            ResultArg::Allowed => Self::Allowed,
            ResultArg::Denied => Self::Denied,
        }
    }
}

/// Execute `command` against `control`.
///
/// # Errors
///
/// Returns an error when the session lacks the needed privilege, when an
/// argument is invalid, or when persisting or writing output fails.
pub async fn run_command<S, R, W>(
    command: Commands,
    cfg: &AppConfig,
    mut control: AccessControl<S>,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let session = control.session();
    debug!(command = ?command, session = ?session.as_ref().map(|s| s.role), "running command");
    match command {
        Commands::Login(args) => {
            let started = control.login(args.role.into())?;
            writeln!(out, "logged in as {} ({})", started.name, started.username)?;
        }
        Commands::Logout => {
            control.logout()?;
            writeln!(out, "logged out")?;
        }
        Commands::Whoami => match session {
            Some(s) => writeln!(out, "{} ({}, {})", s.name, s.username, s.role)?,
            None => writeln!(out, "not logged in")?,
        },
        Commands::Route(args) => {
            writeln!(out, "{}", navigation::resolve(&args.path, session.as_ref()))?;
        }
        Commands::Verify(args) => {
            require(session.as_ref(), Privileges::VERIFY_ACCESS, SessionRole::Operator)?;
            let console = OperatorConsole::new(Arc::new(Mutex::new(control)), cfg.verify_delay());
            let verification = console.verify(&args.code).await?;
            writeln!(out, "{}", outcome_line(&verification))?;
        }
        Commands::Console => {
            require(session.as_ref(), Privileges::VERIFY_ACCESS, SessionRole::Operator)?;
            let console = OperatorConsole::new(Arc::new(Mutex::new(control)), cfg.verify_delay());
            run_console(&console, input, out).await?;
        }
        Commands::Recent(args) => {
            require(session.as_ref(), Privileges::VERIFY_ACCESS, SessionRole::Operator)?;
            write_records(out, control.accesses().recent(args.limit))?;
        }
        Commands::Users(cmd) => {
            require(session.as_ref(), Privileges::MANAGE_USERS, SessionRole::Admin)?;
            run_users(cmd, &mut control, input, out).await?;
        }
        Commands::Accesses(args) => {
            require(session.as_ref(), Privileges::VIEW_ACCESSES, SessionRole::Admin)?;
            run_accesses(args, &control, out).await?;
        }
        Commands::Reports(args) => {
            require(session.as_ref(), Privileges::VIEW_REPORTS, SessionRole::Admin)?;
            run_reports(args, &control, out).await?;
        }
        Commands::Settings(cmd) => {
            require(session.as_ref(), Privileges::EDIT_SETTINGS, SessionRole::Admin)?;
            run_settings(cmd, &mut control, out)?;
        }
    }
    Ok(())
}

fn require(session: Option<&Session>, required: Privileges, role: SessionRole) -> Result<()> {
    if session.is_some_and(|s| s.can(required)) {
        return Ok(());
    }
    bail!("requires an {role} session; run `turnstile login {role}`")
}

fn outcome_line(v: &Verification) -> String {
    let record = &v.record;
    match v.outcome {
        Outcome::Allowed => format!("ALLOWED {} ({}, {})", record.name, record.user_id, record.role_label()),
        Outcome::Denied => format!(
            "DENIED {} ({}, {}): inactive",
            record.name,
            record.user_id,
            record.role_label()
        ),
        Outcome::NotFound => format!("DENIED {} ({})", record.name, record.user_id),
    }
}

/// Verification started from the console and not yet settled.
type PendingVerification<'a> = Pin<Box<dyn Future<Output = Result<Verification, ConsoleError>> + 'a>>;

async fn settle(pending: &mut Option<PendingVerification<'_>>) -> Result<Verification, ConsoleError> {
    match pending.as_mut() {
        Some(verification) => verification.await,
        None => std::future::pending().await,
    }
}

/// Read badge codes until `quit`, `exit` or end of input.
///
/// Input keeps being read while a verification is pending; a code arriving
/// then is rejected as busy. A pending verification always completes before
/// the console closes.
async fn run_console<S, R, W>(console: &OperatorConsole<S>, input: &mut R, out: &mut W) -> Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "console ready; enter a badge code, or `quit` to leave")?;
    out.flush()?;
    let mut lines = input.lines();
    let mut pending: Option<PendingVerification<'_>> = None;
    let mut closing = false;
    loop {
        tokio::select! {
            biased;
            result = settle(&mut pending), if pending.is_some() => {
                pending = None;
                writeln!(out, "{}", outcome_line(&result?))?;
                out.flush()?;
            }
            next = lines.next_line(), if !closing => {
                let Some(line) = next.context("failed to read badge code")? else {
                    closing = true;
                    continue;
                };
                let code = line.trim().to_owned();
                if code.is_empty() {
                    continue;
                }
                if QUIT_WORDS.iter().any(|w| code.eq_ignore_ascii_case(w)) {
                    closing = true;
                } else if pending.is_some() {
                    debug!(code = %code, "badge code rejected while a verification is pending");
                    writeln!(out, "{}; try again", ConsoleError::Busy)?;
                    out.flush()?;
                } else {
                    pending = Some(Box::pin(async move { console.verify(&code).await }));
                }
            }
            else => break,
        }
    }
    info!(status = %console.status(), "console closed");
    Ok(())
}

fn write_records<'a, W: Write>(out: &mut W, records: impl IntoIterator<Item = &'a AccessRecord>) -> Result<()> {
    let mut shown = 0_usize;
    for r in records {
        writeln!(
            out,
            "{}  {:<8} {:<24} {:<15} {}",
            r.datetime.format(DATE_FORMAT),
            r.user_id,
            r.name,
            r.role_label(),
            r.result
        )?;
        shown += 1;
    }
    if shown == 0 {
        writeln!(out, "no access records")?;
    }
    Ok(())
}

async fn run_users<S, R, W>(
    cmd: UsersCommand,
    control: &mut AccessControl<S>,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match cmd {
        UsersCommand::List => {
            for u in control.users() {
                let last = u
                    .last_access
                    .map_or_else(|| "-".to_owned(), |t| t.format(DATE_FORMAT).to_string());
                writeln!(
                    out,
                    "{:<8} {:<24} {:<15} {:<9} {}",
                    u.id, u.name, u.role, u.status, last
                )?;
            }
            writeln!(out, "{} users", control.users().len())?;
        }
        UsersCommand::Add(args) => add_user(args, control, out)?,
        UsersCommand::Edit(args) => edit_user(args, control, out)?,
        UsersCommand::Remove(args) => {
            let Some(user) = control.user(&args.id).cloned() else {
                bail!("no user with id '{}'", args.id.trim());
            };
            if !args.yes && !confirm(&format!("remove {} ({})?", user.name, user.id), input, out).await? {
                writeln!(out, "cancelled")?;
                return Ok(());
            }
            control.remove_user(&user.id)?;
            writeln!(out, "removed {}", user.id)?;
        }
    }
    Ok(())
}

fn add_user<S: KeyValueStore, W: Write>(args: AddUserArgs, control: &mut AccessControl<S>, out: &mut W) -> Result<()> {
    let user = User::new(args.id, args.name, args.role.into(), args.status.into());
    control.add_user(user)?;
    if let Some(added) = control.users().first() {
        writeln!(out, "added {} ({})", added.name, added.id)?;
    }
    Ok(())
}

fn edit_user<S: KeyValueStore, W: Write>(args: EditUserArgs, control: &mut AccessControl<S>, out: &mut W) -> Result<()> {
    let Some(current) = control.user(&args.id).cloned() else {
        bail!("no user with id '{}'", args.id.trim());
    };
    let user = User {
        id: args.new_id.unwrap_or_else(|| current.id.clone()),
        name: args.name.unwrap_or_else(|| current.name.clone()),
        role: args.role.map_or(current.role, Role::from),
        status: args.status.map_or(current.status, UserStatus::from),
        last_access: current.last_access,
    };
    let id = user.id.trim().to_owned();
    control.update_user(&current.id, user)?;
    writeln!(out, "updated {id}")?;
    Ok(())
}

async fn confirm<R, W>(prompt: &str, input: &mut R, out: &mut W) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .await
        .context("failed to read confirmation")?;
    let reply = answer.trim();
    Ok(reply.eq_ignore_ascii_case("y") || reply.eq_ignore_ascii_case("yes"))
}

fn parse_day(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .with_context(|| format!("{flag} must be a date as YYYY-MM-DD, got '{v}'"))
        })
        .transpose()
}

async fn write_export(path: &Path, contents: String) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "export written");
    Ok(())
}

async fn run_accesses<S: KeyValueStore, W: Write>(
    args: AccessesArgs,
    control: &AccessControl<S>,
    out: &mut W,
) -> Result<()> {
    let filter = AccessFilter {
        query: args.query,
        result: args.result.into(),
        from: parse_day("--from", args.from.as_deref())?,
        to: parse_day("--to", args.to.as_deref())?,
    };
    let records = filter.apply(control.accesses());
    write_records(out, records.iter().copied())?;
    writeln!(out, "{} of {} records", records.len(), control.accesses().len())?;
    if let Some(path) = args.export {
        write_export(&path, export::accesses_csv(records.iter().copied())).await?;
        writeln!(out, "exported to {}", path.display())?;
    }
    Ok(())
}

async fn run_reports<S: KeyValueStore, W: Write>(
    args: ReportsArgs,
    control: &AccessControl<S>,
    out: &mut W,
) -> Result<()> {
    let report = Report::build(control.accesses());
    writeln!(out, "Accesses per day")?;
    for day in &report.daily {
        writeln!(out, "  {}  {}", day.day, day.count)?;
    }
    writeln!(
        out,
        "Allowed {}  Denied {}  Total {}",
        report.outcomes.allowed,
        report.outcomes.denied,
        report.outcomes.total()
    )?;
    writeln!(out, "Top users")?;
    for (rank, entry) in report.top_users.iter().enumerate() {
        writeln!(out, "  {}. {} ({})", rank + 1, entry.name, entry.count)?;
    }
    if let Some(path) = args.export {
        write_export(&path, export::summary_csv(&report.outcomes)).await?;
        writeln!(out, "exported to {}", path.display())?;
    }
    Ok(())
}

fn write_settings<W: Write>(out: &mut W, settings: &Settings) -> Result<()> {
    writeln!(out, "manual override: {}", if settings.manual_override { "on" } else { "off" })?;
    writeln!(out, "allowed window: {} - {}", settings.window_start, settings.window_end)?;
    Ok(())
}

fn run_settings<S: KeyValueStore, W: Write>(
    cmd: SettingsCommand,
    control: &mut AccessControl<S>,
    out: &mut W,
) -> Result<()> {
    match cmd {
        SettingsCommand::Show => write_settings(out, control.settings()),
        SettingsCommand::Set(SetSettingsArgs {
            manual_override,
            start,
            end,
        }) => {
            let settings = control.update_settings(SettingsUpdate {
                manual_override,
                window_start: start,
                window_end: end,
            })?;
            write_settings(out, settings)
        }
    }
}
