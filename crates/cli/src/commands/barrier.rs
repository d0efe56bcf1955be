// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zb barrier` - Enter a barrier, work, and leave

use super::{connect, participant, work};
use anyhow::Result;
use clap::Args;
use std::time::Duration;
use zb_core::{BarrierConfig, Variant};
use zb_engine::{BarrierSession, StageController};

#[derive(Args)]
pub struct BarrierArgs {
    /// Participants required before anyone proceeds
    #[arg(long, short = 'q')]
    pub quorum: Option<usize>,

    /// Barrier variant: plain, double, restricted or nested
    #[arg(long, short = 'v')]
    pub variant: Option<Variant>,

    /// Subgroup name (restricted and nested)
    #[arg(long, short = 'g')]
    pub subgroup: Option<String>,

    /// Stage name, repeated in order (nested)
    #[arg(long = "stage", short = 's')]
    pub stages: Vec<String>,

    /// Simulated work between entering and leaving (e.g. "2s", "500ms")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub work: Option<Duration>,
}

impl BarrierArgs {
    fn apply(self, config: &mut BarrierConfig) {
        if let Some(quorum) = self.quorum {
            config.quorum = quorum;
        }
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if self.subgroup.is_some() {
            config.subgroup = self.subgroup;
        }
        if !self.stages.is_empty() {
            config.stages = self.stages;
        }
        if let Some(work) = self.work {
            config.work = work;
        }
    }
}

pub async fn handle(args: BarrierArgs, mut config: BarrierConfig) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let layout = config.layout()?;
    let name = participant(&config)?;
    let namespace = connect(&config).await?;
    let session = BarrierSession::new(namespace, layout, name, config.quorum)?
        .with_capacity(config.notify_capacity);

    if config.variant == Variant::Nested {
        let (quorum, duration) = (config.quorum, config.work);
        let mut controller = StageController::new(session, config.stages.clone())?;
        controller
            .run_stages(|stage| async move {
                println!("Stage {}: all {} participants joined", stage, quorum);
                work(duration).await;
            })
            .await?;
        println!("All stages complete");
        controller.into_session().close().await?;
        return Ok(());
    }

    let mut session = session;
    session.enter().await?;
    println!(
        "All {} participants joined {} as {}",
        config.quorum,
        config.root,
        session
            .identity()
            .map(|entry| entry.to_string())
            .unwrap_or_default()
    );

    work(config.work).await;

    session.leave().await?;
    println!("All participants left {}", config.root);
    session.close().await?;
    Ok(())
}
