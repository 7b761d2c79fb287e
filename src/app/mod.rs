//! Command-line front end.
//!
//! The binary stays a thin wrapper: it parses [`Cli`], installs logging and
//! hands standard input and output to [`dispatch`].

pub mod commands;
pub mod config;

use std::io::Write;

use anyhow::{Context, Result};
use cli_defs::Cli;
use tokio::io::AsyncBufRead;
use tracing::debug;

pub use self::{
    commands::run_command,
    config::{AppConfig, ConfigError},
};
use crate::{control::AccessControl, fixtures::Fixtures, store::FileStore};

/// Log filter used when `RUST_LOG` is unset.
#[must_use]
pub const fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "turnstile=info",
        1 => "turnstile=debug",
        _ => "turnstile=trace",
    }
}

/// Load configuration, open the store and run the parsed command.
///
/// # Errors
///
/// Returns any error raised while loading configuration, opening the store
/// or running the command.
pub async fn dispatch<R, W>(cli: Cli, input: &mut R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Cli {
        config, command, ..
    } = cli;
    let cfg = AppConfig::load(&config)?;
    debug!(?cfg, "configuration loaded");
    let store = FileStore::open(cfg.data_dir())
        .with_context(|| format!("failed to open data directory {}", cfg.data_dir))?;
    let fixtures = Fixtures::bundled().context("bundled fixtures are invalid")?;
    let control = AccessControl::load(store, &fixtures);
    run_command(command, &cfg, control, input, out).await
}
