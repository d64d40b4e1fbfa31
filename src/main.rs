use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use foxtrap::cli::Cli;
use foxtrap::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Quiet by default so the harness does not pollute test output.
    // RUST_LOG takes precedence over both the default and --verbose.
    let default_directives = if cli.verbose { "foxtrap=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli.run()
}
