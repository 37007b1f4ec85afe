//! scmkit CLI - source checkouts as directories or tarballs.
//!
//! Reads a checkout request as JSON, runs the checkout, and prints one JSON
//! record on stdout describing the result. Logs go to stderr.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

mod commands;
mod config_bridge;
mod input;
mod output;

/// scmkit - check out Git, GitHub, Mercurial and Bitbucket sources
#[derive(Debug, Parser)]
#[command(name = "scmkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a configuration file (must exist)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check out into a persistent directory
    Clone(CloneArgs),

    /// Check out and write the tree as a tar archive
    Tarball(TarballArgs),
}

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
struct CommonArgs {
    /// Checkout request as JSON, or `-` to read it from stdin
    #[arg(long)]
    input: String,

    /// Directory to create output under (defaults to the config, then the
    /// system temp dir)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Host path that `--base-dir` is mounted from; rewrites printed paths
    #[arg(long, requires = "base_dir")]
    host_base_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CloneArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory name of the checkout inside the created directory
    #[arg(long)]
    clone_path: Option<String>,
}

#[derive(Debug, Args)]
struct TarballArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// File name of the archive, created inside the base dir
    #[arg(long)]
    tarball_name: String,

    /// Leave VCS metadata (`.git`, `.hg`, ...) out of the archive
    #[arg(long)]
    ignore_checkout_files: bool,

    /// Compress the archive with gzip
    #[arg(long)]
    gzip: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = scmkit_config::Config::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    let log_config = config_bridge::to_log_config(
        &config,
        cli.verbose,
        std::env::var("SCMKIT_LOG").ok().as_deref(),
    );
    if let Err(e) = scmkit_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Clone(args) => commands::clone::run(&config, args).await?,
        Commands::Tarball(args) => commands::tarball::run(&config, args).await?,
    }

    Ok(())
}
