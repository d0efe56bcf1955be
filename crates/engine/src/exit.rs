// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinated departure
//!
//! Tie-break exit: entries are ordered by sequence. The lowest participant
//! stays until everyone else is gone, watching the highest; everyone else
//! removes its own entry and watches the lowest. At any moment only those
//! two entries carry watches, so a departure wakes at most one waiter per
//! role instead of the whole group. The lowest, finding itself alone,
//! removes its entry, the marker and the variant's cascade. The others
//! return only once that marker is gone.
//!
//! Drain exit: remove the own entry and wait for the scope to empty.

use crate::error::BarrierError;
use crate::ops::{delete_quietly, Site};
use zb_adapters::{Namespace, NamespaceError};
use zb_core::{participants, EntryName, NotificationChannel, Scope, READY_MARKER};

/// Leaves one scope and blocks until all peers have departed
pub struct ExitProtocol<'a, N> {
    namespace: &'a N,
    channel: &'a mut NotificationChannel,
    site: Site<'a>,
}

impl<'a, N: Namespace> ExitProtocol<'a, N> {
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

    /// Tie-break exit; the last participant out deletes `cascade` in order
    /// after its own entry and the marker
    pub async fn leave(&mut self, own: &EntryName, cascade: &[String]) -> Result<(), BarrierError> {
        let scope = self.site.scope;
        let own_path = scope.child_path(own.as_str());
        let notifier = self.channel.notifier();

        loop {
            let children = match self.namespace.children(scope.path(), None).await {
                Ok(children) => children,
                // The last leaver already tore the scope down
                Err(NamespaceError::NoSuchPath(_)) => {
                    tracing::info!(scope = %scope, entry = %own, "left, scope already removed");
                    return Ok(());
                }
                Err(e) => return Err(self.site.error("list", scope.path(), e)),
            };
            let entries = participants(&children, READY_MARKER);

            let (Some(lowest), Some(highest)) = (entries.first(), entries.last()) else {
                break;
            };

            if entries.len() == 1 && lowest == own {
                self.teardown(&own_path, cascade).await?;
                tracing::info!(scope = %scope, entry = %own, "left last, scope cleaned up");
                return Ok(());
            }

            let watched = if lowest == own {
                scope.child_path(highest.as_str())
            } else {
                if entries.contains(own) {
                    delete_quietly(self.namespace, &own_path)
                        .await
                        .map_err(|e| self.site.error("delete", &own_path, e))?;
                }
                scope.child_path(lowest.as_str())
            };

            let present = self
                .namespace
                .exists(&watched, Some(&notifier))
                .await
                .map_err(|e| self.site.error("watch", &watched, e))?;
            if !present {
                // Gone between the listing and the watch; no event will come
                continue;
            }

            tracing::debug!(
                scope = %scope,
                entry = %own,
                watching = %watched,
                remaining = entries.len(),
                "waiting for peers to leave"
            );
            self.site.wait(self.channel).await?;
        }

        self.await_marker_removal(own).await
    }

    /// Block until the last leaver has removed the marker
    ///
    /// Called once no entries remain. Entrants of a later round register
    /// only after the marker is gone, so entries showing up again also mean
    /// it was removed.
    async fn await_marker_removal(&mut self, own: &EntryName) -> Result<(), BarrierError> {
        let scope = self.site.scope;
        let marker = scope.marker_path();
        let notifier = self.channel.notifier();

        loop {
            let marked = self
                .namespace
                .exists(marker, Some(&notifier))
                .await
                .map_err(|e| self.site.error("watch", marker, e))?;
            if !marked {
                break;
            }

            match self.namespace.children(scope.path(), None).await {
                Ok(children) if participants(&children, READY_MARKER).is_empty() => {}
                Ok(_) | Err(NamespaceError::NoSuchPath(_)) => break,
                Err(e) => return Err(self.site.error("list", scope.path(), e)),
            }

            tracing::debug!(scope = %scope, entry = %own, "waiting for marker removal");
            self.site.wait(self.channel).await?;
        }

        tracing::info!(scope = %scope, entry = %own, "left");
        Ok(())
    }

    /// Drain exit: remove the own entry, then wait until no entries remain
    pub async fn drain(&mut self, own: &EntryName) -> Result<(), BarrierError> {
        let scope = self.site.scope;
        let own_path = scope.child_path(own.as_str());
        let notifier = self.channel.notifier();

        delete_quietly(self.namespace, &own_path)
            .await
            .map_err(|e| self.site.error("delete", &own_path, e))?;

        loop {
            let children = match self.namespace.children(scope.path(), Some(&notifier)).await {
                Ok(children) => children,
                Err(NamespaceError::NoSuchPath(_)) => return Ok(()),
                Err(e) => return Err(self.site.error("list", scope.path(), e)),
            };
            let remaining = participants(&children, READY_MARKER).len();

            if remaining == 0 {
                let marker = scope.marker_path();
                delete_quietly(self.namespace, marker)
                    .await
                    .map_err(|e| self.site.error("delete", marker, e))?;
                tracing::info!(scope = %scope, entry = %own, "drained");
                return Ok(());
            }

            tracing::debug!(scope = %scope, remaining, "waiting for scope to drain");
            self.site.wait(self.channel).await?;
        }
    }

    async fn teardown(&self, own_path: &str, cascade: &[String]) -> Result<(), BarrierError> {
        let marker = self.site.scope.marker_path();
        for path in [own_path, marker]
            .into_iter()
            .chain(cascade.iter().map(String::as_str))
        {
            delete_quietly(self.namespace, path)
                .await
                .map_err(|e| self.site.error("delete", path, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "exit_tests.rs"]
mod tests;
