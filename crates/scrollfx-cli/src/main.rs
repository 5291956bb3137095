use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollfx_core::AppConfig;

mod clock;
mod commands;
mod page;
mod trace;

#[derive(Parser)]
#[command(name = "scrollfx")]
#[command(author, version, about = "Scroll-driven visual effects, checked and replayed offline")]
struct Cli {
    /// Config file to use instead of ~/.config/scrollfx/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration
    Check {
        /// Also report how many nodes each selector matches on this page
        #[arg(short, long)]
        page: Option<PathBuf>,
    },
    /// Replay a scroll trace against a page and print every style commit
    Simulate {
        /// Page description (TOML)
        #[arg(short, long)]
        page: PathBuf,
        /// Recorded events (JSON)
        #[arg(short, long)]
        trace: PathBuf,
        /// Behave as if the user asked for reduced motion
        #[arg(long)]
        reduced_motion: bool,
    },
    /// Print the default configuration
    Defaults {
        /// Write it to the default config path instead
        #[arg(long)]
        write: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(AppConfig::load()?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.as_deref())?;

    // Initialize logging; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Check { page } => commands::check::run(&config, page.as_deref()),
        Commands::Simulate {
            page,
            trace,
            reduced_motion,
        } => commands::simulate::run(config, &page, &trace, reduced_motion).await,
        Commands::Defaults { write } => commands::defaults::run(write),
    }
}
