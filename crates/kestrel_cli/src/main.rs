mod args;
mod format;
mod history;
mod parser;
mod repl;
mod timing;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use std::process;
use tracing::debug;

use kestrel_engine::{Database, JsonStorage};

fn main() {
    if let Err(e) = run() {
        eprintln!("kestrel: error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let storage = JsonStorage::new(&args.data_dir);
    let mut db = Database::open(storage).context("Could not open database")?;

    if let Some(line) = args.command.as_deref() {
        debug!("Mode: -c");
        let cmd = parser::parse(line)?;
        repl::execute(&mut db, cmd, &args)?;
    } else {
        debug!("Mode: REPL");
        repl::run(&mut db, &args)?;
    }

    Ok(())
}
