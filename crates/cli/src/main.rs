// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zb - distributed barrier client

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{barrier, config, gate, queue};
use std::path::PathBuf;
use zb_core::BarrierConfig;

#[derive(Parser)]
#[command(
    name = "zb",
    version,
    about = "zb - Barrier synchronization over ZooKeeper"
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Coordination service endpoint (host:port[,host:port...])
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Namespace path the barrier lives under
    #[arg(long, global = true)]
    root: Option<String>,

    /// Participant name prefix (generated when omitted)
    #[arg(long, global = true)]
    participant: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter a barrier, work, and leave it
    Barrier(barrier::BarrierArgs),
    /// Open or wait on a single-node gate
    Gate(gate::GateArgs),
    /// Produce to or consume from a queue
    Queue(queue::QueueArgs),
    /// Print the resolved configuration
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load the config file, then apply global flag overrides
    fn resolve_config(&self) -> Result<BarrierConfig> {
        let mut config = match &self.config {
            Some(path) => BarrierConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => BarrierConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(participant) = &self.participant {
            config.participant = Some(participant.clone());
        }
        Ok(config)
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let config = cli.resolve_config()?;

    match cli.command {
        Commands::Barrier(args) => barrier::handle(args, config).await,
        Commands::Gate(args) => gate::handle(args, config).await,
        Commands::Queue(args) => queue::handle(args, config).await,
        Commands::Config(args) => config::handle(args, config),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
