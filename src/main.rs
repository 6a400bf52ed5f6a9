use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    thread,
    time::Duration,
};

use anyhow::{bail, Context as _};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::context::Context;

mod context;
mod releaser;
mod semaphore;
mod worker;

/// Several workers competing for one file behind a binary semaphore, with a
/// timer that frees it after a delay.
#[derive(Parser)]
struct Cli {
    /// File to read; prompted on stdin when omitted.
    path: Option<PathBuf>,

    /// Number of concurrent readers.
    #[arg(long, default_value_t = 2)]
    workers: u8,

    /// Delay in milliseconds before the timer frees the file.
    #[arg(long, default_value_t = 2000)]
    release_after: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let path = match cli.path {
        Some(path) => path,
        None => prompt_for_path()?,
    };

    let ctx = Arc::new(Context::new(path));
    let mut handles = Vec::new();

    for id in 0..cli.workers {
        let ctx = Arc::clone(&ctx);
        handles.push(thread::spawn(move || worker::run(ctx, id)));
    }
    {
        let ctx = Arc::clone(&ctx);
        let delay = Duration::from_millis(cli.release_after);
        handles.push(thread::spawn(move || releaser::run(ctx, delay)));
    }

    // Every task is accounted for here; exiting earlier would leak threads
    // still parked on the semaphore.
    for handle in handles {
        if handle.join().is_err() {
            bail!("a task panicked");
        }
    }
    Ok(())
}

/// Reads the file name from stdin before any task starts. Failure here is
/// fatal: without an identifier there is nothing to coordinate on.
fn prompt_for_path() -> anyhow::Result<PathBuf> {
    print!("File name: ");
    io::stdout().flush().context("failed to flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read file name")?;

    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("no file name provided");
    }
    Ok(PathBuf::from(trimmed))
}
