//! `turnstile` binary entry point.

use anyhow::Result;
use clap::Parser;
use cli_defs::Cli;
use tokio::io::{BufReader, stdin};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use turnstile::app::{default_log_filter, dispatch};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(cli.verbose)));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut input = BufReader::new(stdin());
    let mut out = std::io::stdout().lock();
    dispatch(cli, &mut input, &mut out).await
}
