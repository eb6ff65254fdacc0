//! CLI entry point for bnd-nelua.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// bnd-nelua — generate Nelua bindings from C headers.
#[derive(Parser, Debug)]
#[command(name = "bnd-nelua", version, about)]
struct Cli {
    /// Path to the bnd-nelua.toml configuration file.
    #[arg(default_value = "bnd-nelua.toml")]
    config: PathBuf,

    /// Output file path (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bnd_nelua=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    bnd_nelua::run(&cli.config, cli.output.as_deref())?;
    Ok(())
}
