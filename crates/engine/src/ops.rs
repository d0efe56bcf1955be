// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace helpers shared by the protocols
//!
//! Peers create and delete the same persistent nodes concurrently. These
//! helpers absorb the errors such races produce and pass everything else on.

use crate::error::BarrierError;
use zb_adapters::{CreateMode, Namespace, NamespaceError};
use zb_core::{NotificationChannel, Scope};

/// Times a path chain or entry create is retried after a concurrent
/// teardown removed an ancestor underneath it
pub(crate) const CHAIN_ATTEMPTS: usize = 3;

/// The scope and quorum a protocol runs under, attached to its errors
#[derive(Clone, Copy, Debug)]
pub(crate) struct Site<'a> {
    pub scope: &'a Scope,
    pub quorum: usize,
}

impl Site<'_> {
    pub fn error(&self, op: &'static str, path: &str, source: NamespaceError) -> BarrierError {
        BarrierError::Coordination {
            op,
            path: path.to_string(),
            scope: self.scope.to_string(),
            quorum: self.quorum,
            source,
        }
    }

    /// Block until a watch fires
    pub async fn wait(&self, channel: &mut NotificationChannel) -> Result<(), BarrierError> {
        match channel.wait().await {
            Some(event) => {
                tracing::debug!(scope = %self.scope, kind = ?event.kind, path = %event.path, "woken");
                Ok(())
            }
            None => Err(BarrierError::ChannelClosed(self.scope.to_string())),
        }
    }
}

/// Every prefix of an absolute path, outermost first
///
/// `/a/b/c` gives `/a`, `/a/b`, `/a/b/c`.
pub(crate) fn path_chain(path: &str) -> Vec<String> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .scan(String::new(), |prefix, segment| {
            prefix.push('/');
            prefix.push_str(segment);
            Some(prefix.clone())
        })
        .collect()
}

/// Create every path in order as a persistent node, tolerating ones that
/// already exist
pub(crate) async fn ensure_chain<N: Namespace>(
    namespace: &N,
    paths: &[String],
) -> Result<(), NamespaceError> {
    let mut attempt = 0;
    'retry: loop {
        attempt += 1;
        for path in paths {
            match namespace.create(path, &[], CreateMode::Persistent).await {
                Ok(_) | Err(NamespaceError::AlreadyExists(_)) => {}
                Err(NamespaceError::NoParent(_)) if attempt < CHAIN_ATTEMPTS => {
                    tracing::debug!(path = %path, attempt, "ancestor removed underneath, retrying");
                    continue 'retry;
                }
                Err(e) => return Err(e),
            }
        }
        return Ok(());
    }
}

/// Create a persistent node; returns false if a peer got there first
pub(crate) async fn create_quietly<N: Namespace>(
    namespace: &N,
    path: &str,
) -> Result<bool, NamespaceError> {
    match namespace.create(path, &[], CreateMode::Persistent).await {
        Ok(_) => Ok(true),
        Err(NamespaceError::AlreadyExists(_)) => {
            tracing::debug!(path, "already created by a peer");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Delete a node; returns false if it was already gone or still has
/// children
pub(crate) async fn delete_quietly<N: Namespace>(
    namespace: &N,
    path: &str,
) -> Result<bool, NamespaceError> {
    match namespace.delete(path, None).await {
        Ok(()) => Ok(true),
        Err(NamespaceError::NoSuchPath(_)) => {
            tracing::debug!(path, "already deleted");
            Ok(false)
        }
        Err(NamespaceError::NotEmpty(_)) => {
            tracing::debug!(path, "still in use, kept");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
