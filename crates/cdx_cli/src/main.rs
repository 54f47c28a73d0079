//! Cdx CLI
//!
//! Drives the sample screen stack headlessly: `cdx run` plays a scripted
//! gesture sequence through the main menu, the high-score table, and the
//! options menu, then prints what happened. `cdx init` writes a starter
//! `cdx.toml`.

mod config;
mod session;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CdxConfig;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "cdx")]
#[command(about = "Headless driver for the Cdx screen stack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scripted session
    Run {
        /// Config file, or a directory holding cdx.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many frames
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: f32,

        /// Log at debug level unless RUST_LOG says otherwise
        #[arg(short, long)]
        verbose: bool,
    },
    /// Write a starter cdx.toml
    Init {
        /// Directory or file to write
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            frames,
            fps,
            verbose,
        } => {
            init_tracing(verbose);
            run(config.as_deref(), frames, fps)
        }
        Command::Init { path } => {
            init_tracing(false);
            init(&path)
        }
    }
}

fn run(config_path: Option<&Path>, frames: u64, fps: f32) -> Result<()> {
    let config = match config_path {
        Some(path) => CdxConfig::load_from_path(path)?,
        None if Path::new("cdx.toml").exists() => CdxConfig::load_from_path(Path::new("cdx.toml"))?,
        None => CdxConfig::default(),
    };

    let mut session = Session::new(config);
    session.restore()?;
    let summary = session.run(frames, fps);
    session.persist()?;

    info!(frames = summary.frames, "session finished");
    println!("{summary}");
    Ok(())
}

fn init(path: &Path) -> Result<()> {
    let target = if path.is_dir() {
        path.join("cdx.toml")
    } else {
        path.to_path_buf()
    };
    if target.exists() {
        anyhow::bail!("{} already exists", target.display());
    }

    fs::write(&target, CdxConfig::starter().to_toml()?)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    println!("Created {}", target.display());
    Ok(())
}
