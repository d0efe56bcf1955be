// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination service adapters
//!
//! A [`Namespace`] is one client session against a hierarchical namespace
//! with atomic create/delete and one-shot watches. Watches are delivered to
//! the [`Notifier`] passed when arming them, on a context independent of
//! the caller.

mod zk;

pub use zk::ZkNamespace;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNamespace, NamespaceCall};

use async_trait::async_trait;
use thiserror::Error;
use zb_core::Notifier;

/// Errors from namespace operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    #[error("node already exists: {0}")]
    AlreadyExists(String),
    #[error("parent node does not exist: {0}")]
    NoParent(String),
    #[error("no such node: {0}")]
    NoSuchPath(String),
    #[error("node has children: {0}")]
    NotEmpty(String),
    #[error("version mismatch: {0}")]
    BadVersion(String),
    #[error("connection lost: {0}")]
    ConnectionLoss(String),
    #[error("session expired")]
    SessionExpired,
    #[error("could not connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("coordination service error: {0}")]
    Other(String),
}

impl NamespaceError {
    /// Whether the caller may retry the whole operation on a new attempt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NamespaceError::ConnectionLoss(_) | NamespaceError::SessionExpired
        )
    }
}

/// How a node is created
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateMode {
    Persistent,
    PersistentSequential,
    /// Removed by the service when the creating session ends
    Ephemeral,
    EphemeralSequential,
}

impl CreateMode {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, CreateMode::Ephemeral | CreateMode::EphemeralSequential)
    }

    /// Whether the service appends a 10-digit sequence to the requested path
    pub fn is_sequential(&self) -> bool {
        matches!(
            self,
            CreateMode::PersistentSequential | CreateMode::EphemeralSequential
        )
    }
}

/// One client session against the coordination service
#[async_trait]
pub trait Namespace: Clone + Send + Sync + 'static {
    /// Create a node, returning the realized path (with sequence suffix for
    /// sequential modes)
    async fn create(
        &self,
        path: &str,
        data: &[u8],
        mode: CreateMode,
    ) -> Result<String, NamespaceError>;

    /// Delete a node; `None` matches any version
    async fn delete(&self, path: &str, version: Option<i32>) -> Result<(), NamespaceError>;

    /// Check presence, optionally arming a one-shot watch on the node
    async fn exists(&self, path: &str, watch: Option<&Notifier>) -> Result<bool, NamespaceError>;

    /// List child names, optionally arming a one-shot watch on the child set
    async fn children(
        &self,
        path: &str,
        watch: Option<&Notifier>,
    ) -> Result<Vec<String>, NamespaceError>;

    /// Read a node's payload
    async fn get_data(&self, path: &str) -> Result<Vec<u8>, NamespaceError>;

    /// End the session; its ephemeral nodes are reclaimed by the service
    async fn close(&self) -> Result<(), NamespaceError>;
}
