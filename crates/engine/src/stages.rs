// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage sequencing for nested barriers
//!
//! Each stage is an independent barrier under the subgroup: its own entries,
//! its own marker, its own count. The last participant out of a stage
//! removes the stage node; only the final stage's last participant goes on
//! to remove the subgroup and root.

use crate::error::BarrierError;
use crate::session::BarrierSession;
use std::collections::HashSet;
use std::future::Future;
use zb_adapters::Namespace;
use zb_core::{validate_name, Variant};

/// Runs a nested barrier's stages in order
pub struct StageController<N> {
    session: BarrierSession<N>,
    stages: Vec<String>,
}

impl<N: Namespace> StageController<N> {
    pub fn new(session: BarrierSession<N>, stages: Vec<String>) -> Result<Self, BarrierError> {
        if session.variant() != Variant::Nested {
            return Err(BarrierError::NotStaged(session.variant()));
        }
        if stages.is_empty() {
            return Err(BarrierError::NoStages);
        }
        let mut seen = HashSet::new();
        for stage in &stages {
            validate_name(stage)?;
            if !seen.insert(stage.as_str()) {
                return Err(BarrierError::DuplicateStage(stage.clone()));
            }
        }

        Ok(Self { session, stages })
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn session(&self) -> &BarrierSession<N> {
        &self.session
    }

    pub fn into_session(self) -> BarrierSession<N> {
        self.session
    }

    /// Enter, run `work`, and leave each stage in turn
    ///
    /// Stops at the first stage that fails; the failed stage's entry is left
    /// for the service to reclaim with the session.
    pub async fn run_stages<F, Fut>(&mut self, mut work: F) -> Result<(), BarrierError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = ()>,
    {
        let last = self.stages.len() - 1;
        for (index, stage) in self.stages.iter().enumerate() {
            self.session.enter_stage(Some(stage)).await?;
            tracing::info!(stage = %stage, index, "stage entered");

            work(stage.clone()).await;

            self.session.leave_stage(index == last).await?;
            tracing::info!(stage = %stage, index, "stage left");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "stages_tests.rs"]
mod tests;
