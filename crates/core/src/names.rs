// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participant names
//!
//! A participant name is only the prefix of its entry. The service appends
//! the sequence that orders entries, so a name has to be unique among live
//! participants and valid as one path segment, nothing more.

use crate::layout::{validate_name, LayoutError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Supplies names for participants that were not given one
pub trait NameSource: Clone + Send + Sync {
    fn next_name(&self) -> String;
}

/// `p` followed by a random v4 UUID in simple form
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNames;

impl NameSource for RandomNames {
    fn next_name(&self) -> String {
        format!("p{}", uuid::Uuid::new_v4().simple())
    }
}

/// `{prefix}1`, `{prefix}2`, ...; clones draw from the same counter
#[derive(Clone, Debug)]
pub struct NumberedNames {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl NumberedNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for NumberedNames {
    fn default() -> Self {
        Self::new("p")
    }
}

impl NameSource for NumberedNames {
    fn next_name(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// The configured name, checked, or else a fresh one from `source`
pub fn resolve_participant<S: NameSource>(
    configured: Option<&str>,
    source: &S,
) -> Result<String, LayoutError> {
    match configured {
        Some(name) => {
            validate_name(name)?;
            Ok(name.to_string())
        }
        None => Ok(source.next_name()),
    }
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
