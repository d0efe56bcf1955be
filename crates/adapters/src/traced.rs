// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced namespace wrapper for consistent observability

use crate::namespace::{CreateMode, Namespace, NamespaceError};
use async_trait::async_trait;
use std::time::Instant;
use tracing::Instrument;
use zb_core::Notifier;

/// Whether an error is an expected outcome of a concurrent peer's action
fn is_race(err: &NamespaceError) -> bool {
    matches!(
        err,
        NamespaceError::AlreadyExists(_)
            | NamespaceError::NoSuchPath(_)
            | NamespaceError::NotEmpty(_)
    )
}

/// Wrapper that adds tracing to any Namespace
#[derive(Clone)]
pub struct TracedNamespace<N> {
    inner: N,
}

impl<N> TracedNamespace<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

#[async_trait]
impl<N: Namespace> Namespace for TracedNamespace<N> {
    async fn create(
        &self,
        path: &str,
        data: &[u8],
        mode: CreateMode,
    ) -> Result<String, NamespaceError> {
        let span = tracing::info_span!("namespace.create", path, mode = ?mode);
        async {
            let start = Instant::now();
            let result = self.inner.create(path, data, mode).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(created) => tracing::debug!(created = %created, elapsed_ms, "created"),
                Err(e) if is_race(e) => tracing::debug!(error = %e, elapsed_ms, "create raced"),
                Err(e) => tracing::error!(error = %e, elapsed_ms, "create failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, path: &str, version: Option<i32>) -> Result<(), NamespaceError> {
        let span = tracing::info_span!("namespace.delete", path);
        async {
            let start = Instant::now();
            let result = self.inner.delete(path, version).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            // A peer deleting first is routine during teardown
            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "deleted"),
                Err(e) if is_race(e) => tracing::debug!(error = %e, elapsed_ms, "delete raced"),
                Err(e) => tracing::error!(error = %e, elapsed_ms, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn exists(&self, path: &str, watch: Option<&Notifier>) -> Result<bool, NamespaceError> {
        let result = self.inner.exists(path, watch).await;
        match &result {
            Ok(present) => tracing::trace!(path, watch = watch.is_some(), present, "checked"),
            Err(e) => tracing::error!(path, error = %e, "exists failed"),
        }
        result
    }

    async fn children(
        &self,
        path: &str,
        watch: Option<&Notifier>,
    ) -> Result<Vec<String>, NamespaceError> {
        let result = self.inner.children(path, watch).await;
        match &result {
            Ok(names) => tracing::trace!(path, watch = watch.is_some(), count = names.len(), "listed"),
            Err(e) if is_race(e) => tracing::debug!(path, error = %e, "list raced"),
            Err(e) => tracing::error!(path, error = %e, "list failed"),
        }
        result
    }

    async fn get_data(&self, path: &str) -> Result<Vec<u8>, NamespaceError> {
        let result = self.inner.get_data(path).await;
        tracing::trace!(path, len = result.as_ref().map(|d| d.len()).ok(), "read");
        result
    }

    async fn close(&self) -> Result<(), NamespaceError> {
        let result = self.inner.close().await;
        match &result {
            Ok(()) => tracing::info!("session closed"),
            Err(e) => tracing::warn!(error = %e, "close failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
