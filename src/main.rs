use std::io;

use anyhow::{Context, Result};
use sparring_uci::UciEngine;
use tracing::info;

fn main() -> Result<()> {
    // stdout carries the UCI protocol, so logs go to stderr.
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    info!("sparring starting");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    UciEngine::new()
        .run(stdin.lock(), &mut stdout)
        .context("UCI session failed")?;
    Ok(())
}
