use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kmzclip::cli::{Cli, Commands};
use kmzclip::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Export(args) => commands::export(&cli, args),
    }
}

/// Stderr logging; default level raised by `-v`, overridable via `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
