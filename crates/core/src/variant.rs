// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier variants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which barrier protocol a session runs
///
/// The variant decides where entries live and what the final leaver tears
/// down; the entry protocol is shared by all of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Entries directly under the root; leave drains until no entry remains
    Plain,
    /// Entries directly under the root; leave uses the lowest/highest tie-break
    #[default]
    Double,
    /// Double barrier scoped to a subgroup; the final leaver removes the
    /// subgroup and the root
    Restricted,
    /// Restricted barrier run as a sequence of stages inside the subgroup
    Nested,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Plain,
        Variant::Double,
        Variant::Restricted,
        Variant::Nested,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Plain => "plain",
            Variant::Double => "double",
            Variant::Restricted => "restricted",
            Variant::Nested => "nested",
        }
    }

    /// Whether entries are scoped to a named subgroup
    pub fn needs_subgroup(&self) -> bool {
        matches!(self, Variant::Restricted | Variant::Nested)
    }

    /// Whether every scope is a stage inside the subgroup
    pub fn is_staged(&self) -> bool {
        matches!(self, Variant::Nested)
    }

    /// Whether leave uses the lowest/highest tie-break instead of a plain drain
    pub fn uses_tie_break(&self) -> bool {
        !matches!(self, Variant::Plain)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown barrier variant '{0}' (expected plain, double, restricted or nested)")]
pub struct VariantParseError(pub String);

impl FromStr for Variant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VariantParseError(s.to_string()))
    }
}
