//! Development tasks for the behavior tree engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Demo, InspectProfile};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Development tasks for the behavior tree engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for behavior-tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Read and inspect a binary profiler dump
    InspectProfile(InspectProfile),

    /// Tick a sample patrol tree and optionally write its profile
    Demo(Demo),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for BT_PROFILE, BT_TRACE and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::InspectProfile(cmd) => cmd.execute(),
        Command::Demo(cmd) => cmd.execute(),
    }
}
