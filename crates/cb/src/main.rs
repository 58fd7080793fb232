//! Code Battles CLI.
//!
//! Provides commands for:
//! - `build`: Prepare the site once (links, docs, packed sources, manifest)
//! - `serve`: Prepare the site, then serve it with live reload

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, ServeArgs};
use output::Output;

/// Code Battles - site toolchain.
#[derive(Parser)]
#[command(name = "cb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare the site for the bundler.
    Build(BuildArgs),
    /// Prepare the site and start the development server.
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.project.verbose,
        Commands::Serve(args) => args.project.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(&output),
        Commands::Serve(args) => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(args.execute(&output)),
            Err(e) => Err(e.into()),
        },
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
