// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ZooKeeper-backed namespace

use super::{CreateMode, Namespace, NamespaceError};
use async_trait::async_trait;
use std::time::Duration;
use zb_core::{Notifier, WatchEvent, WatchKind};
use zookeeper_client as zk;

/// Namespace session on a ZooKeeper ensemble
///
/// Clones share one session. The session ends, and the service reclaims its
/// ephemeral entries, when the last clone is dropped.
#[derive(Clone)]
pub struct ZkNamespace {
    client: zk::Client,
    endpoint: String,
}

impl ZkNamespace {
    /// Establish a session, failing if none is up within `timeout`
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, NamespaceError> {
        let client = match tokio::time::timeout(timeout, zk::Client::connect(endpoint)).await {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => {
                return Err(NamespaceError::Connect {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(NamespaceError::Connect {
                    endpoint: endpoint.to_string(),
                    reason: format!("no session after {}ms", timeout.as_millis()),
                })
            }
        };

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn zk_mode(mode: CreateMode) -> zk::CreateMode {
    match mode {
        CreateMode::Persistent => zk::CreateMode::Persistent,
        CreateMode::PersistentSequential => zk::CreateMode::PersistentSequential,
        CreateMode::Ephemeral => zk::CreateMode::Ephemeral,
        CreateMode::EphemeralSequential => zk::CreateMode::EphemeralSequential,
    }
}

fn map_error(path: &str, err: zk::Error) -> NamespaceError {
    match err {
        zk::Error::NodeExists => NamespaceError::AlreadyExists(path.to_string()),
        zk::Error::NoNode => NamespaceError::NoSuchPath(path.to_string()),
        zk::Error::NotEmpty => NamespaceError::NotEmpty(path.to_string()),
        zk::Error::BadVersion => NamespaceError::BadVersion(path.to_string()),
        zk::Error::ConnectionLoss => NamespaceError::ConnectionLoss(path.to_string()),
        zk::Error::SessionExpired => NamespaceError::SessionExpired,
        other => NamespaceError::Other(format!("{}: {}", path, other)),
    }
}

/// Forward a fired watch into the session's notification channel
fn forward(watcher: zk::OneshotWatcher, notifier: Notifier) {
    tokio::spawn(async move {
        let event = watcher.changed().await;
        let kind = match event.event_type {
            zk::EventType::NodeCreated => WatchKind::Created,
            zk::EventType::NodeDeleted => WatchKind::Deleted,
            zk::EventType::NodeDataChanged => WatchKind::DataChanged,
            zk::EventType::NodeChildrenChanged => WatchKind::ChildrenChanged,
            _ => WatchKind::Session,
        };
        notifier.notify(WatchEvent::new(kind, event.path.to_string()));
    });
}

#[async_trait]
impl Namespace for ZkNamespace {
    async fn create(
        &self,
        path: &str,
        data: &[u8],
        mode: CreateMode,
    ) -> Result<String, NamespaceError> {
        let options = zk_mode(mode).with_acls(zk::Acls::anyone_all());
        let (_stat, sequence) = self
            .client
            .create(path, data, &options)
            .await
            .map_err(|e| match e {
                // ZooKeeper reports a missing parent as NoNode on create
                zk::Error::NoNode => NamespaceError::NoParent(path.to_string()),
                other => map_error(path, other),
            })?;

        if mode.is_sequential() {
            Ok(format!("{}{}", path, sequence))
        } else {
            Ok(path.to_string())
        }
    }

    async fn delete(&self, path: &str, version: Option<i32>) -> Result<(), NamespaceError> {
        self.client
            .delete(path, version)
            .await
            .map_err(|e| map_error(path, e))
    }

    async fn exists(&self, path: &str, watch: Option<&Notifier>) -> Result<bool, NamespaceError> {
        match watch {
            Some(notifier) => {
                let (stat, watcher) = self
                    .client
                    .check_and_watch_stat(path)
                    .await
                    .map_err(|e| map_error(path, e))?;
                forward(watcher, notifier.clone());
                Ok(stat.is_some())
            }
            None => {
                let stat = self
                    .client
                    .check_stat(path)
                    .await
                    .map_err(|e| map_error(path, e))?;
                Ok(stat.is_some())
            }
        }
    }

    async fn children(
        &self,
        path: &str,
        watch: Option<&Notifier>,
    ) -> Result<Vec<String>, NamespaceError> {
        match watch {
            Some(notifier) => {
                let (children, watcher) = self
                    .client
                    .list_and_watch_children(path)
                    .await
                    .map_err(|e| map_error(path, e))?;
                forward(watcher, notifier.clone());
                Ok(children)
            }
            None => self
                .client
                .list_children(path)
                .await
                .map_err(|e| map_error(path, e)),
        }
    }

    async fn get_data(&self, path: &str) -> Result<Vec<u8>, NamespaceError> {
        let (data, _stat) = self
            .client
            .get_data(path)
            .await
            .map_err(|e| map_error(path, e))?;
        Ok(data)
    }

    async fn close(&self) -> Result<(), NamespaceError> {
        // Dropping the last handle ends the session
        tracing::debug!(endpoint = %self.endpoint, "releasing session handle");
        Ok(())
    }
}
