// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod barrier;
pub mod config;
pub mod gate;
pub mod queue;

use anyhow::{Context, Result};
use std::time::Duration;
use zb_adapters::{TracedNamespace, ZkNamespace};
use zb_core::{resolve_participant, BarrierConfig, RandomNames};

/// Open a traced session on the configured endpoint
pub async fn connect(config: &BarrierConfig) -> Result<TracedNamespace<ZkNamespace>> {
    let namespace = ZkNamespace::connect(&config.endpoint, config.connect_timeout)
        .await
        .with_context(|| format!("connecting to {}", config.endpoint))?;
    tracing::info!(endpoint = %config.endpoint, "connected");
    Ok(TracedNamespace::new(namespace))
}

/// Configured participant name, or a fresh random one
pub fn participant(config: &BarrierConfig) -> Result<String> {
    Ok(resolve_participant(config.participant.as_deref(), &RandomNames)?)
}

/// Stand-in for the work done between synchronization points
pub async fn work(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    println!("Working for {}", humantime::format_duration(duration));
    tokio::time::sleep(duration).await;
}
