// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-node gate
//!
//! A starter opens the gate by creating its node once some condition holds;
//! everyone else blocks until the node exists. The starter removes it when
//! done so the next run starts closed.

use crate::error::BarrierError;
use crate::ops::{create_quietly, delete_quietly, ensure_chain, path_chain};
use zb_adapters::{Namespace, NamespaceError};
use zb_core::{validate_root, NotificationChannel};

pub struct Gate<N> {
    namespace: N,
    path: String,
    channel: NotificationChannel,
}

impl<N: Namespace> Gate<N> {
    pub fn new(namespace: N, path: impl Into<String>) -> Result<Self, BarrierError> {
        let path = path.into();
        validate_root(&path)?;
        Ok(Self {
            namespace,
            path,
            channel: NotificationChannel::default(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn error(&self, op: &'static str, source: NamespaceError) -> BarrierError {
        BarrierError::Namespace {
            op,
            path: self.path.clone(),
            source,
        }
    }

    /// Open the gate; opening an already open gate is a no-op
    pub async fn open(&self) -> Result<(), BarrierError> {
        let mut parents = path_chain(&self.path);
        parents.pop();
        ensure_chain(&self.namespace, &parents)
            .await
            .map_err(|e| self.error("open", e))?;

        if create_quietly(&self.namespace, &self.path)
            .await
            .map_err(|e| self.error("open", e))?
        {
            tracing::info!(path = %self.path, "gate opened");
        }
        Ok(())
    }

    /// Block until the gate is open
    pub async fn wait_open(&mut self) -> Result<(), BarrierError> {
        let notifier = self.channel.notifier();
        loop {
            let open = self
                .namespace
                .exists(&self.path, Some(&notifier))
                .await
                .map_err(|e| self.error("watch", e))?;
            if open {
                tracing::info!(path = %self.path, "gate open, proceeding");
                return Ok(());
            }

            tracing::debug!(path = %self.path, "waiting for gate");
            if self.channel.wait().await.is_none() {
                return Err(BarrierError::ChannelClosed(self.path.clone()));
            }
        }
    }

    /// Remove the gate node
    pub async fn remove(&self) -> Result<(), BarrierError> {
        if delete_quietly(&self.namespace, &self.path)
            .await
            .map_err(|e| self.error("remove", e))?
        {
            tracing::info!(path = %self.path, "gate removed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
