// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory namespace for testing
//!
//! Models the parts of ZooKeeper the barrier depends on: sequential naming
//! per parent, ephemeral ownership per session, one-shot node and child
//! watches, and asynchronous watch delivery with an injectable delay.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CreateMode, Namespace, NamespaceError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use zb_core::{Notifier, WatchEvent, WatchKind};

/// Recorded namespace call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceCall {
    Create { path: String, mode: CreateMode },
    Delete { path: String },
    Exists { path: String, watch: bool },
    Children { path: String, watch: bool },
    GetData { path: String },
    Close,
}

#[derive(Debug)]
struct FakeNode {
    data: Vec<u8>,
    version: i32,
    owner: Option<u64>,
    next_sequence: u64,
}

impl FakeNode {
    fn new(data: Vec<u8>, owner: Option<u64>) -> Self {
        Self {
            data,
            version: 0,
            owner,
            next_sequence: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Watch {
    session: u64,
    notifier: Notifier,
}

#[derive(Debug)]
struct FakeState {
    nodes: BTreeMap<String, FakeNode>,
    node_watches: HashMap<String, Vec<Watch>>,
    child_watches: HashMap<String, Vec<Watch>>,
    calls: Vec<(u64, NamespaceCall)>,
    peak_watched: HashMap<String, usize>,
    expired: HashSet<u64>,
    next_session: u64,
    delay: Duration,
}

impl Default for FakeState {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), FakeNode::new(Vec::new(), None));
        Self {
            nodes,
            node_watches: HashMap::new(),
            child_watches: HashMap::new(),
            calls: Vec::new(),
            peak_watched: HashMap::new(),
            expired: HashSet::new(),
            next_session: 1,
            delay: Duration::ZERO,
        }
    }
}

fn parent_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn add_watch(watches: &mut HashMap<String, Vec<Watch>>, path: &str, watch: Watch) {
    let list = watches.entry(path.to_string()).or_default();
    if !list
        .iter()
        .any(|w| w.session == watch.session && w.notifier.same_channel(&watch.notifier))
    {
        list.push(watch);
    }
}

impl FakeState {
    fn check_session(&self, session: u64) -> Result<(), NamespaceError> {
        if self.expired.contains(&session) {
            Err(NamespaceError::SessionExpired)
        } else {
            Ok(())
        }
    }

    fn child_names(&self, path: &str) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|p| p.as_str() != "/" && parent_of(p) == path)
            .map(|p| name_of(p).to_string())
            .collect()
    }

    fn deliver(&self, watches: Vec<Watch>, event: WatchEvent) {
        for watch in watches {
            if self.delay.is_zero() {
                watch.notifier.notify(event.clone());
            } else {
                let delay = self.delay;
                let event = event.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    watch.notifier.notify(event);
                });
            }
        }
    }

    fn fire_node(&mut self, path: &str, kind: WatchKind) {
        if let Some(watches) = self.node_watches.remove(path) {
            self.deliver(watches, WatchEvent::new(kind, path));
        }
    }

    fn fire_children(&mut self, path: &str, kind: WatchKind) {
        if let Some(watches) = self.child_watches.remove(path) {
            self.deliver(watches, WatchEvent::new(kind, path));
        }
    }

    fn remove_node(&mut self, path: &str) {
        self.nodes.remove(path);
        self.fire_node(path, WatchKind::Deleted);
        self.fire_children(path, WatchKind::Deleted);
        self.fire_children(parent_of(path), WatchKind::ChildrenChanged);
    }

    /// Track the most distinct live ephemeral nodes watched under one parent
    fn record_watched(&mut self, path: &str) {
        let parent = parent_of(path);
        let watched = self
            .node_watches
            .iter()
            .filter(|(p, list)| {
                !list.is_empty()
                    && parent_of(p) == parent
                    && self.nodes.get(p.as_str()).is_some_and(|n| n.owner.is_some())
            })
            .count();
        let peak = self.peak_watched.entry(parent.to_string()).or_default();
        *peak = (*peak).max(watched);
    }
}

/// In-memory namespace for testing
///
/// Handles from [`connect`](Self::connect) share one namespace but are
/// distinct sessions, each owning its own ephemeral nodes.
#[derive(Clone, Debug)]
pub struct FakeNamespace {
    state: Arc<Mutex<FakeState>>,
    session: u64,
}

impl Default for FakeNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeNamespace {
    pub fn new() -> Self {
        let mut state = FakeState::default();
        let session = state.next_session;
        state.next_session += 1;
        Self {
            state: Arc::new(Mutex::new(state)),
            session,
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open another session on the same namespace
    pub fn connect(&self) -> Self {
        let mut state = self.state();
        let session = state.next_session;
        state.next_session += 1;
        Self {
            state: Arc::clone(&self.state),
            session,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session
    }

    /// Expire this session as the service would after a crash: its
    /// ephemeral nodes go away and peers' watches fire
    pub fn expire(&self) {
        let mut guard = self.state();
        let state = &mut *guard;
        state.expired.insert(self.session);
        for watches in state
            .node_watches
            .values_mut()
            .chain(state.child_watches.values_mut())
        {
            watches.retain(|w| w.session != self.session);
        }

        let owned: Vec<String> = state
            .nodes
            .iter()
            .filter(|(_, node)| node.owner == Some(self.session))
            .map(|(path, _)| path.clone())
            .collect();
        for path in owned {
            state.remove_node(&path);
        }
    }

    /// Delay every watch delivery from now on
    pub fn set_notification_delay(&self, delay: Duration) {
        self.state().delay = delay;
    }

    /// Calls made through this session
    pub fn calls(&self) -> Vec<NamespaceCall> {
        self.state()
            .calls
            .iter()
            .filter(|(session, _)| *session == self.session)
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn node_exists(&self, path: &str) -> bool {
        self.state().nodes.contains_key(path)
    }

    /// Sorted child names of `path`
    pub fn child_names(&self, path: &str) -> Vec<String> {
        self.state().child_names(path)
    }

    /// Every node except the implicit `/`
    pub fn paths(&self) -> Vec<String> {
        self.state()
            .nodes
            .keys()
            .filter(|p| p.as_str() != "/")
            .cloned()
            .collect()
    }

    /// Most distinct ephemeral children of `parent` watched at the same time
    pub fn peak_watched_entries(&self, parent: &str) -> usize {
        self.state()
            .peak_watched
            .get(parent)
            .copied()
            .unwrap_or(0)
    }

    /// Watches armed and not yet fired, across all sessions
    pub fn live_watches(&self) -> usize {
        let state = self.state();
        state
            .node_watches
            .values()
            .chain(state.child_watches.values())
            .map(Vec::len)
            .sum()
    }
}

#[async_trait]
impl Namespace for FakeNamespace {
    async fn create(
        &self,
        path: &str,
        data: &[u8],
        mode: CreateMode,
    ) -> Result<String, NamespaceError> {
        let mut state = self.state();
        state.check_session(self.session)?;
        state.calls.push((
            self.session,
            NamespaceCall::Create {
                path: path.to_string(),
                mode,
            },
        ));

        let parent = parent_of(path).to_string();
        let sequence = match state.nodes.get_mut(&parent) {
            None => return Err(NamespaceError::NoParent(path.to_string())),
            Some(node) if node.owner.is_some() => {
                return Err(NamespaceError::Other(format!(
                    "ephemeral node {} cannot have children",
                    parent
                )))
            }
            Some(node) => {
                let sequence = node.next_sequence;
                node.next_sequence += 1;
                sequence
            }
        };

        let realized = if mode.is_sequential() {
            format!("{}{:010}", path, sequence)
        } else {
            path.to_string()
        };
        if state.nodes.contains_key(&realized) {
            return Err(NamespaceError::AlreadyExists(realized));
        }

        let owner = mode.is_ephemeral().then_some(self.session);
        state
            .nodes
            .insert(realized.clone(), FakeNode::new(data.to_vec(), owner));
        state.fire_node(&realized, WatchKind::Created);
        state.fire_children(&parent, WatchKind::ChildrenChanged);

        Ok(realized)
    }

    async fn delete(&self, path: &str, version: Option<i32>) -> Result<(), NamespaceError> {
        let mut state = self.state();
        state.check_session(self.session)?;
        state.calls.push((
            self.session,
            NamespaceCall::Delete {
                path: path.to_string(),
            },
        ));

        let node = state
            .nodes
            .get(path)
            .ok_or_else(|| NamespaceError::NoSuchPath(path.to_string()))?;
        if version.is_some_and(|v| v != node.version) {
            return Err(NamespaceError::BadVersion(path.to_string()));
        }
        if !state.child_names(path).is_empty() {
            return Err(NamespaceError::NotEmpty(path.to_string()));
        }

        state.remove_node(path);
        Ok(())
    }

    async fn exists(&self, path: &str, watch: Option<&Notifier>) -> Result<bool, NamespaceError> {
        let mut state = self.state();
        state.check_session(self.session)?;
        state.calls.push((
            self.session,
            NamespaceCall::Exists {
                path: path.to_string(),
                watch: watch.is_some(),
            },
        ));

        if let Some(notifier) = watch {
            add_watch(
                &mut state.node_watches,
                path,
                Watch {
                    session: self.session,
                    notifier: notifier.clone(),
                },
            );
            state.record_watched(path);
        }

        Ok(state.nodes.contains_key(path))
    }

    async fn children(
        &self,
        path: &str,
        watch: Option<&Notifier>,
    ) -> Result<Vec<String>, NamespaceError> {
        let mut state = self.state();
        state.check_session(self.session)?;
        state.calls.push((
            self.session,
            NamespaceCall::Children {
                path: path.to_string(),
                watch: watch.is_some(),
            },
        ));

        if !state.nodes.contains_key(path) {
            return Err(NamespaceError::NoSuchPath(path.to_string()));
        }
        if let Some(notifier) = watch {
            add_watch(
                &mut state.child_watches,
                path,
                Watch {
                    session: self.session,
                    notifier: notifier.clone(),
                },
            );
        }

        Ok(state.child_names(path))
    }

    async fn get_data(&self, path: &str) -> Result<Vec<u8>, NamespaceError> {
        let mut state = self.state();
        state.check_session(self.session)?;
        state.calls.push((
            self.session,
            NamespaceCall::GetData {
                path: path.to_string(),
            },
        ));

        state
            .nodes
            .get(path)
            .map(|node| node.data.clone())
            .ok_or_else(|| NamespaceError::NoSuchPath(path.to_string()))
    }

    async fn close(&self) -> Result<(), NamespaceError> {
        self.state().calls.push((self.session, NamespaceCall::Close));
        self.expire();
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
