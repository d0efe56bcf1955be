// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One participant's handle on a barrier

use crate::entry::EntryProtocol;
use crate::error::BarrierError;
use crate::exit::ExitProtocol;
use zb_adapters::Namespace;
use zb_core::{validate_name, BarrierLayout, EntryName, NotificationChannel, Scope, Variant};

/// The scope currently entered and the entry that holds it
#[derive(Clone, Debug)]
struct Held {
    scope: Scope,
    entry: EntryName,
}

/// A participant in one barrier
///
/// Owns its namespace session, its notification channel and its identity.
/// Every `enter` must be followed by a `leave` before entering again.
pub struct BarrierSession<N> {
    namespace: N,
    layout: BarrierLayout,
    participant: String,
    quorum: usize,
    channel: NotificationChannel,
    held: Option<Held>,
}

impl<N: Namespace> BarrierSession<N> {
    pub fn new(
        namespace: N,
        layout: BarrierLayout,
        participant: impl Into<String>,
        quorum: usize,
    ) -> Result<Self, BarrierError> {
        let participant = participant.into();
        validate_name(&participant)?;
        if quorum == 0 {
            return Err(BarrierError::ZeroQuorum);
        }

        Ok(Self {
            namespace,
            layout,
            participant,
            quorum,
            channel: NotificationChannel::default(),
            held: None,
        })
    }

    /// Replace the notification channel with one of the given capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.channel = NotificationChannel::new(capacity);
        self
    }

    pub fn variant(&self) -> Variant {
        self.layout.variant()
    }

    pub fn layout(&self) -> &BarrierLayout {
        &self.layout
    }

    pub fn participant(&self) -> &str {
        &self.participant
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn namespace(&self) -> &N {
        &self.namespace
    }

    /// Realized entry name while entered
    pub fn identity(&self) -> Option<&EntryName> {
        self.held.as_ref().map(|held| &held.entry)
    }

    /// Full path of the own entry while entered
    pub fn entry_path(&self) -> Option<String> {
        self.held
            .as_ref()
            .map(|held| held.scope.child_path(held.entry.as_str()))
    }

    /// Times this session was woken by a watch
    pub fn wakeups(&self) -> u64 {
        self.channel.wakeups()
    }

    /// Enter the barrier; blocks until quorum
    pub async fn enter(&mut self) -> Result<(), BarrierError> {
        self.enter_stage(None).await
    }

    /// Leave the barrier; blocks until every peer has left
    pub async fn leave(&mut self) -> Result<(), BarrierError> {
        self.leave_stage(true).await
    }

    /// Enter one stage of a nested barrier, or the barrier itself when
    /// `stage` is `None`
    pub async fn enter_stage(&mut self, stage: Option<&str>) -> Result<(), BarrierError> {
        if let Some(held) = &self.held {
            return Err(BarrierError::AlreadyEntered(held.scope.to_string()));
        }

        let scope = self.layout.scope(stage)?;
        let ancestors = self.layout.ancestors(&scope);
        tracing::debug!(
            scope = %scope,
            participant = %self.participant,
            quorum = self.quorum,
            variant = %self.layout.variant(),
            "entering"
        );

        let entry = EntryProtocol::new(&self.namespace, &mut self.channel, &scope, self.quorum)
            .enter(&ancestors, &self.participant)
            .await?;
        self.held = Some(Held { scope, entry });
        Ok(())
    }

    /// Leave the currently entered scope
    ///
    /// `is_final_stage` only matters for nested barriers, where it decides
    /// whether the last leaver also removes the subgroup and root.
    pub async fn leave_stage(&mut self, is_final_stage: bool) -> Result<(), BarrierError> {
        let held = self.held.take().ok_or(BarrierError::NotEntered)?;
        let mut exit = ExitProtocol::new(&self.namespace, &mut self.channel, &held.scope, self.quorum);

        let result = if self.layout.variant().uses_tie_break() {
            let cascade = self.layout.cascade(&held.scope, is_final_stage);
            exit.leave(&held.entry, &cascade).await
        } else {
            exit.drain(&held.entry).await
        };

        if result.is_err() {
            // The entry may still be registered; allow the caller to retry
            self.held = Some(held);
        }
        result
    }

    /// Release the namespace session
    ///
    /// An entry still held is reclaimed by the service, which peers observe
    /// as an ordinary departure.
    pub async fn close(self) -> Result<(), BarrierError> {
        if let Some(held) = &self.held {
            tracing::warn!(scope = %held.scope, entry = %held.entry, "closing while entered");
        }
        self.namespace
            .close()
            .await
            .map_err(|source| BarrierError::Namespace {
                op: "close",
                path: self.layout.root().to_string(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
