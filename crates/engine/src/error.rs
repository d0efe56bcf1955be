// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the barrier engine

use thiserror::Error;
use zb_adapters::NamespaceError;
use zb_core::{EntryNameError, LayoutError};

/// Errors that can occur while synchronizing
#[derive(Debug, Error)]
pub enum BarrierError {
    #[error("{op} {path} failed at {scope} (quorum {quorum}): {source}")]
    Coordination {
        op: &'static str,
        path: String,
        scope: String,
        quorum: usize,
        #[source]
        source: NamespaceError,
    },
    #[error("{op} {path} failed: {source}")]
    Namespace {
        op: &'static str,
        path: String,
        #[source]
        source: NamespaceError,
    },
    #[error("service returned a malformed entry: {0}")]
    MalformedEntry(#[from] EntryNameError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("quorum must be at least 1")]
    ZeroQuorum,
    #[error("already entered {0}")]
    AlreadyEntered(String),
    #[error("leave called without a matching enter")]
    NotEntered,
    #[error("{0} barrier does not run stages")]
    NotStaged(zb_core::Variant),
    #[error("stage list must not be empty")]
    NoStages,
    #[error("duplicate stage '{0}'")]
    DuplicateStage(String),
    #[error("notification channel closed while waiting at {0}")]
    ChannelClosed(String),
    #[error("queue element {path} holds {len} bytes, expected 4")]
    MalformedElement { path: String, len: usize },
}

impl BarrierError {
    /// Whether the failure came from a lost connection or session, as
    /// opposed to a misuse or a corrupt namespace
    pub fn is_transient(&self) -> bool {
        match self {
            BarrierError::Coordination { source, .. } | BarrierError::Namespace { source, .. } => {
                source.is_transient()
            }
            _ => false,
        }
    }
}
