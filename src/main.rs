//! # Treepad - A Directory-Tree Text Editor
//!
//! Open a folder, browse its tree, edit a file, save it back.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the editor and pick a folder
//! cargo run
//!
//! # Open a folder directly
//! cargo run -- path/to/project
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use treepad_core::Config;
use treepad_ui::{Flags, run};

/// Treepad - a directory-tree text editor built in Rust
#[derive(Parser, Debug)]
#[command(name = "treepad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder to open
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Folder to open (same as DIR)
    #[arg(short, long, value_name = "DIR", conflicts_with = "dir")]
    workspace: Option<PathBuf>,

    /// Configuration file to use instead of the default one
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn root(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(|| self.workspace.clone())
    }
}

fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(log_filter(args.verbose))
        .init();

    tracing::info!("Starting Treepad v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?,
        None => Config::load(),
    };

    let flags = Flags {
        root: args.root(),
        config,
    };

    run(flags).map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
