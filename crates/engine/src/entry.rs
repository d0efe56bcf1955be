// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quorum-gated entry
//!
//! A participant arms a watch on the scope's ready marker, registers its own
//! sequential entry, and then alternates between re-reading state and waiting
//! for a watch. Whoever first counts a quorum creates the marker; everyone
//! else passes on seeing it. Because the marker outlives early departures, a
//! late wakeup still observes that quorum was reached.
//!
//! Registration waits while a marker from an earlier round is still present,
//! so any marker seen after registering was created by this round.

use crate::error::BarrierError;
use crate::ops::{create_quietly, ensure_chain, Site, CHAIN_ATTEMPTS};
use zb_adapters::{CreateMode, Namespace, NamespaceError};
use zb_core::{participants, EntryName, NotificationChannel, Scope, READY_MARKER};

/// Joins one scope and blocks until its quorum is reached
pub struct EntryProtocol<'a, N> {
    namespace: &'a N,
    channel: &'a mut NotificationChannel,
    site: Site<'a>,
}

impl<'a, N: Namespace> EntryProtocol<'a, N> {
    pub fn new(
        namespace: &'a N,
        channel: &'a mut NotificationChannel,
        scope: &'a Scope,
        quorum: usize,
    ) -> Self {
        Self {
            namespace,
            channel,
            site: Site { scope, quorum },
        }
    }

    /// Enter the scope, creating `ancestors` first
    ///
    /// Returns the realized entry once the marker exists or this
    /// participant counted a quorum and created it.
    pub async fn enter(
        &mut self,
        ancestors: &[String],
        participant: &str,
    ) -> Result<EntryName, BarrierError> {
        let scope = self.site.scope;
        let marker = scope.marker_path();
        let notifier = self.channel.notifier();

        ensure_chain(self.namespace, ancestors)
            .await
            .map_err(|e| self.site.error("prepare", scope.path(), e))?;

        // A marker present before registering belongs to a round that has
        // not finished draining; counting toward it would skip the quorum
        while self
            .namespace
            .exists(marker, Some(&notifier))
            .await
            .map_err(|e| self.site.error("watch", marker, e))?
        {
            tracing::debug!(scope = %scope, "previous round still draining");
            self.site.wait(self.channel).await?;
        }

        let entry = self.create_entry(ancestors, participant).await?;
        tracing::debug!(scope = %scope, entry = %entry, "registered");

        loop {
            let ready = self
                .namespace
                .exists(marker, Some(&notifier))
                .await
                .map_err(|e| self.site.error("watch", marker, e))?;
            if ready {
                tracing::info!(scope = %scope, entry = %entry, "entered");
                return Ok(entry);
            }

            let children = self
                .namespace
                .children(scope.path(), Some(&notifier))
                .await
                .map_err(|e| self.site.error("list", scope.path(), e))?;
            let count = participants(&children, READY_MARKER).len();

            if count < self.site.quorum {
                tracing::debug!(scope = %scope, count, quorum = self.site.quorum, "waiting for quorum");
                self.site.wait(self.channel).await?;
                continue;
            }

            if !create_quietly(self.namespace, marker)
                .await
                .map_err(|e| self.site.error("mark", marker, e))?
            {
                tracing::debug!(scope = %scope, "marker raced");
            }
            tracing::info!(scope = %scope, entry = %entry, count, "quorum reached");
            return Ok(entry);
        }
    }

    /// Entry that trusts the child count and never creates a marker
    ///
    /// This is faulty: a participant woken after a peer already passed and
    /// left recounts below quorum and waits forever. It exists only so the
    /// failure stays reproducible in tests.
    #[cfg(test)]
    pub(crate) async fn enter_count_only(
        &mut self,
        ancestors: &[String],
        participant: &str,
    ) -> Result<EntryName, BarrierError> {
        let scope = self.site.scope;
        let notifier = self.channel.notifier();

        ensure_chain(self.namespace, ancestors)
            .await
            .map_err(|e| self.site.error("prepare", scope.path(), e))?;
        let entry = self.create_entry(ancestors, participant).await?;

        loop {
            let children = self
                .namespace
                .children(scope.path(), Some(&notifier))
                .await
                .map_err(|e| self.site.error("list", scope.path(), e))?;
            if participants(&children, READY_MARKER).len() >= self.site.quorum {
                return Ok(entry);
            }
            self.site.wait(self.channel).await?;
        }
    }

    async fn create_entry(
        &self,
        ancestors: &[String],
        participant: &str,
    ) -> Result<EntryName, BarrierError> {
        let prefix = self.site.scope.entry_prefix(participant);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .namespace
                .create(&prefix, &[], CreateMode::EphemeralSequential)
                .await
            {
                Ok(path) => return Ok(EntryName::from_path(&path)?),
                Err(NamespaceError::NoParent(_)) if attempt < CHAIN_ATTEMPTS => {
                    tracing::debug!(scope = %self.site.scope, attempt, "scope removed before entry, recreating");
                    ensure_chain(self.namespace, ancestors)
                        .await
                        .map_err(|e| self.site.error("prepare", self.site.scope.path(), e))?;
                }
                Err(e) => return Err(self.site.error("register", &prefix, e)),
            }
        }
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
