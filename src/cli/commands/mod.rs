//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `resolve`: Locate audio files in the catalog
//! - `tools`: Fingerprint tooling and config checks

mod resolve;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use resolve::{ResolveArgs, cmd_resolve};
pub use tools::{cmd_check_tools, cmd_config};

/// Track Resolver CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Locate audio files in the catalog
    Resolve {
        /// Files or directories to resolve
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Resolve each directory as one album
        #[arg(long)]
        album: bool,
        /// Never fall back to acoustic fingerprints
        #[arg(long)]
        no_fingerprint: bool,
        /// AcoustID API key (or set ACOUSTID_API_KEY env var)
        #[arg(short, long, env = "ACOUSTID_API_KEY")]
        api_key: Option<String>,
        /// Print outcomes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check if fingerprinting tools are installed
    CheckTools,
    /// Show the config file location and effective settings
    Config {
        /// Write the effective settings to the config file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref());

    match &cli.command {
        Commands::Resolve {
            paths,
            album,
            no_fingerprint,
            api_key,
            json,
        } => {
            let rt = Runtime::new()?;
            let args = ResolveArgs {
                paths: paths.clone(),
                album: *album,
                fingerprint: !*no_fingerprint,
                api_key: api_key.clone(),
                json: *json,
            };
            cmd_resolve(&rt, &config, &args)
        }
        Commands::CheckTools => cmd_check_tools(&config),
        Commands::Config { init } => cmd_config(cli.config.as_deref(), &config, *init),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Config {
    match path {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Print installation instructions for fpcalc
pub(crate) fn print_fpcalc_install_instructions() {
    eprintln!("fpcalc not found.");
    eprintln!("Install Chromaprint:");
    eprintln!("  Windows: winget install AcoustID.Chromaprint");
    eprintln!("  macOS:   brew install chromaprint");
    eprintln!("  Linux:   apt install libchromaprint-tools");
}
