use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dyntable::cli::{run, Cli};

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dyntable=warn")),
        )
        .init();

    run(Cli::parse())
}
