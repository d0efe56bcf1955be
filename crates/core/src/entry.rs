// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participant entry names and their tie-break order
//!
//! The coordination service appends a zero-padded, monotonically increasing
//! sequence to every sequential create. Participants compare entries by that
//! sequence only: prefixes come from different hosts and carry no order.

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryNameError {
    #[error("entry '{0}' has no sequence suffix")]
    MissingSequence(String),
    #[error("entry '{0}' has an empty participant prefix")]
    EmptyPrefix(String),
}

/// Realized name of a participant entry, `<participant>-<sequence>`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryName {
    name: String,
    sequence: u64,
}

impl EntryName {
    /// Parse a bare child name as returned by a children listing
    pub fn parse(name: &str) -> Result<Self, EntryNameError> {
        let (prefix, digits) = name
            .rsplit_once('-')
            .ok_or_else(|| EntryNameError::MissingSequence(name.to_string()))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EntryNameError::MissingSequence(name.to_string()));
        }
        if prefix.is_empty() {
            return Err(EntryNameError::EmptyPrefix(name.to_string()));
        }
        let sequence = digits
            .parse()
            .map_err(|_| EntryNameError::MissingSequence(name.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            sequence,
        })
    }

    /// Parse the last segment of a realized path returned by create
    pub fn from_path(path: &str) -> Result<Self, EntryNameError> {
        let name = path.rsplit('/').next().unwrap_or(path);
        Self::parse(name)
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Ord for EntryName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for EntryName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Participant entries among a scope's children, lowest sequence first
///
/// The marker and anything that is not a sequential entry are skipped.
pub fn participants<I, S>(children: I, marker: &str) -> Vec<EntryName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries: Vec<EntryName> = children
        .into_iter()
        .filter(|child| child.as_ref() != marker)
        .filter_map(|child| match EntryName::parse(child.as_ref()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring foreign child");
                None
            }
        })
        .collect();
    entries.sort();
    entries
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
