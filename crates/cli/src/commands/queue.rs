// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zb queue` - Producer/consumer queue

use super::connect;
use anyhow::Result;
use clap::{Args, Subcommand};
use zb_core::{validate_root, BarrierConfig};
use zb_engine::WorkQueue;

#[derive(Args)]
pub struct QueueArgs {
    /// Queue node path
    #[arg(long, default_value = "/app1", global = true)]
    pub path: String,

    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// Append values start, start+1, ... to the queue
    Produce {
        /// Number of values to produce
        #[arg(long, short = 'n', default_value = "1")]
        count: u32,
        /// First value
        #[arg(long, default_value = "10", allow_negative_numbers = true)]
        start: i32,
    },
    /// Take values from the queue, waiting while it is empty
    Consume {
        /// Number of values to consume
        #[arg(long, short = 'n', default_value = "1")]
        count: u32,
    },
}

pub async fn handle(args: QueueArgs, config: BarrierConfig) -> Result<()> {
    if config.endpoint.trim().is_empty() {
        anyhow::bail!("endpoint must not be empty");
    }
    validate_root(&args.path)?;
    let namespace = connect(&config).await?;
    let mut queue = WorkQueue::open(namespace, args.path).await?;

    match args.command {
        QueueCommand::Produce { count, start } => {
            for offset in 0..count {
                let value = start.wrapping_add(offset as i32);
                queue.produce(value).await?;
                println!("Produced: {}", value);
            }
        }
        QueueCommand::Consume { count } => {
            for _ in 0..count {
                let value = queue.consume().await?;
                println!("Item: {}", value);
            }
        }
    }
    Ok(())
}
