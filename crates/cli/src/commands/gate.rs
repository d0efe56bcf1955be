// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zb gate` - Single-node gate

use super::{connect, work};
use anyhow::Result;
use clap::Args;
use std::time::Duration;
use zb_core::{validate_root, BarrierConfig};
use zb_engine::Gate;

#[derive(Args)]
pub struct GateArgs {
    /// Open the gate, work, then remove it
    #[arg(long)]
    pub starter: bool,

    /// Simulated work once through the gate (e.g. "2s")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub work: Option<Duration>,
}

pub async fn handle(args: GateArgs, config: BarrierConfig) -> Result<()> {
    if config.endpoint.trim().is_empty() {
        anyhow::bail!("endpoint must not be empty");
    }
    validate_root(&config.root)?;
    let namespace = connect(&config).await?;
    let mut gate = Gate::new(namespace, config.root.clone())?;
    let duration = args.work.unwrap_or(config.work);

    if args.starter {
        gate.open().await?;
        println!("Gate {} open", gate.path());
        work(duration).await;
        gate.remove().await?;
        println!("Gate {} removed", gate.path());
    } else {
        gate.wait_open().await?;
        println!("Gate {} open, proceeding", gate.path());
        work(duration).await;
    }
    Ok(())
}
