// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zb config` - Print the resolved configuration

use anyhow::Result;
use clap::Args;
use zb_core::BarrierConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Validate before printing and fail on invalid settings
    #[arg(long)]
    pub check: bool,
}

pub fn handle(args: ConfigArgs, config: BarrierConfig) -> Result<()> {
    if args.check {
        config.validate()?;
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
