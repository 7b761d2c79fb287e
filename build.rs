//! Renders the `turnstile(1)` man page from the clap definitions in
//! `cli-defs`.
//!
//! The page is written to `OUT_DIR`. Analysis-only runs that provide no
//! output directory skip rendering.

use std::{env, fs, io, path::Path};

use clap::CommandFactory;
use clap_mangen::Man;
use cli_defs::Cli;

const MAN_PAGE: &str = "turnstile.1";

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=cli-defs/src");

    let Some(out_dir) = env::var_os("OUT_DIR") else {
        return Ok(());
    };

    let mut page = Vec::new();
    Man::new(Cli::command()).render(&mut page)?;
    fs::write(Path::new(&out_dir).join(MAN_PAGE), page)
}
