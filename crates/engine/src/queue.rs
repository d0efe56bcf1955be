// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Producer/consumer queue
//!
//! Producers append persistent sequential `element` nodes holding a 4-byte
//! big-endian value. Consumers take the lowest sequence; losing a race for
//! it to another consumer just means trying the next one.

use crate::error::BarrierError;
use crate::ops::{ensure_chain, path_chain};
use zb_adapters::{CreateMode, Namespace, NamespaceError};
use zb_core::{validate_root, NotificationChannel};

/// Name prefix of queue elements; the service appends the sequence
pub const ELEMENT_PREFIX: &str = "element";

fn element_sequence(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(ELEMENT_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub struct WorkQueue<N> {
    namespace: N,
    root: String,
    channel: NotificationChannel,
}

impl<N: Namespace> WorkQueue<N> {
    /// Open the queue at `root`, creating it and its parents if needed
    pub async fn open(namespace: N, root: impl Into<String>) -> Result<Self, BarrierError> {
        let root = root.into();
        validate_root(&root)?;
        ensure_chain(&namespace, &path_chain(&root))
            .await
            .map_err(|source| BarrierError::Namespace {
                op: "prepare",
                path: root.clone(),
                source,
            })?;

        Ok(Self {
            namespace,
            root,
            channel: NotificationChannel::default(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn error(&self, op: &'static str, path: &str, source: NamespaceError) -> BarrierError {
        BarrierError::Namespace {
            op,
            path: path.to_string(),
            source,
        }
    }

    /// Append a value, returning the created element path
    pub async fn produce(&self, value: i32) -> Result<String, BarrierError> {
        let prefix = format!("{}/{}", self.root, ELEMENT_PREFIX);
        let path = self
            .namespace
            .create(&prefix, &value.to_be_bytes(), CreateMode::PersistentSequential)
            .await
            .map_err(|e| self.error("produce", &prefix, e))?;
        tracing::debug!(path = %path, value, "produced");
        Ok(path)
    }

    /// Remove and return the oldest value, waiting while the queue is empty
    pub async fn consume(&mut self) -> Result<i32, BarrierError> {
        let notifier = self.channel.notifier();
        loop {
            let children = self
                .namespace
                .children(&self.root, Some(&notifier))
                .await
                .map_err(|e| self.error("list", &self.root, e))?;

            let Some(head) = children
                .iter()
                .filter_map(|name| element_sequence(name).map(|seq| (seq, name)))
                .min()
                .map(|(_, name)| format!("{}/{}", self.root, name))
            else {
                tracing::debug!(root = %self.root, "queue empty, waiting");
                if self.channel.wait().await.is_none() {
                    return Err(BarrierError::ChannelClosed(self.root.clone()));
                }
                continue;
            };

            let data = match self.namespace.get_data(&head).await {
                Ok(data) => data,
                Err(NamespaceError::NoSuchPath(_)) => continue,
                Err(e) => return Err(self.error("read", &head, e)),
            };
            match self.namespace.delete(&head, Some(0)).await {
                Ok(()) => {}
                Err(NamespaceError::NoSuchPath(_)) => {
                    tracing::debug!(path = %head, "taken by another consumer");
                    continue;
                }
                Err(e) => return Err(self.error("delete", &head, e)),
            }

            let bytes: [u8; 4] = data.as_slice().try_into().map_err(|_| {
                BarrierError::MalformedElement {
                    path: head.clone(),
                    len: data.len(),
                }
            })?;
            let value = i32::from_be_bytes(bytes);
            tracing::debug!(path = %head, value, "consumed");
            return Ok(value);
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
