//! CLI entry point for the splitter.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zipsplit::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();

    // WARN by default, raised by -v/-vv, RUST_LOG takes precedence
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
