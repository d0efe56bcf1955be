// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace path layout for each barrier variant
//!
//! Everything here is a pure function of (variant, root, subgroup, stage,
//! is-final-stage). The protocols never build paths by hand.
//!
//! ```text
//! plain / double      <root>/<participant>-<seq>        <root>/ready
//! restricted          <root>/<group>/<participant>-<seq> <root>/<group>/ready
//! nested              <root>/<group>/<stage>/...         <root>/<group>/<stage>/ready
//! ```

use crate::variant::Variant;
use thiserror::Error;

/// Name of the marker created once quorum is observed
pub const READY_MARKER: &str = "ready";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid root path '{0}': must be absolute with no empty or trailing segments")]
    InvalidRoot(String),
    #[error("invalid name '{0}': must be non-empty, contain no '/', and not be '{READY_MARKER}'")]
    InvalidName(String),
    #[error("{0} barrier requires a subgroup")]
    MissingSubgroup(Variant),
    #[error("{0} barrier does not take a subgroup")]
    UnexpectedSubgroup(Variant),
    #[error("nested barrier requires a stage")]
    StageRequired,
    #[error("{0} barrier does not take a stage")]
    UnexpectedStage(Variant),
}

/// Check a single path segment (subgroup, stage or participant name)
pub fn validate_name(name: &str) -> Result<(), LayoutError> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." || name == READY_MARKER
    {
        return Err(LayoutError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Check an absolute node path such as a barrier root or queue path
pub fn validate_root(root: &str) -> Result<(), LayoutError> {
    let valid = root.len() > 1
        && root.starts_with('/')
        && root[1..].split('/').all(|segment| !segment.is_empty());
    if valid {
        Ok(())
    } else {
        Err(LayoutError::InvalidRoot(root.to_string()))
    }
}

/// One gated namespace: the parent of participant entries and the marker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    path: String,
    marker: String,
    stage: Option<String>,
}

impl Scope {
    fn new(path: String, stage: Option<String>) -> Self {
        let marker = format!("{}/{}", path, READY_MARKER);
        Self {
            path,
            marker,
            stage,
        }
    }

    /// Path of the node participant entries are created under
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the ready marker for this scope
    pub fn marker_path(&self) -> &str {
        &self.marker
    }

    /// Stage this scope belongs to, for nested barriers
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    /// Prefix handed to a sequential create; the service appends the sequence
    pub fn entry_prefix(&self, participant: &str) -> String {
        format!("{}/{}-", self.path, participant)
    }

    /// Full path of a child entry
    pub fn child_path(&self, name: &str) -> String {
        format!("{}/{}", self.path, name)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Validated placement of a barrier in the namespace
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BarrierLayout {
    variant: Variant,
    root: String,
    subgroup: Option<String>,
}

impl BarrierLayout {
    pub fn new(
        variant: Variant,
        root: impl Into<String>,
        subgroup: Option<String>,
    ) -> Result<Self, LayoutError> {
        let root = root.into();
        validate_root(&root)?;

        match (&subgroup, variant.needs_subgroup()) {
            (None, true) => return Err(LayoutError::MissingSubgroup(variant)),
            (Some(_), false) => return Err(LayoutError::UnexpectedSubgroup(variant)),
            (Some(group), true) => validate_name(group)?,
            (None, false) => {}
        }

        Ok(Self {
            variant,
            root,
            subgroup,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Path of the subgroup node, for restricted and nested barriers
    pub fn subgroup_path(&self) -> Option<String> {
        self.subgroup
            .as_ref()
            .map(|group| format!("{}/{}", self.root, group))
    }

    /// Resolve the scope entries are created under
    ///
    /// Nested barriers require a stage; every other variant rejects one.
    pub fn scope(&self, stage: Option<&str>) -> Result<Scope, LayoutError> {
        let base = self.subgroup_path().unwrap_or_else(|| self.root.clone());

        match (stage, self.variant.is_staged()) {
            (None, true) => Err(LayoutError::StageRequired),
            (Some(_), false) => Err(LayoutError::UnexpectedStage(self.variant)),
            (Some(stage), true) => {
                validate_name(stage)?;
                Ok(Scope::new(
                    format!("{}/{}", base, stage),
                    Some(stage.to_string()),
                ))
            }
            (None, false) => Ok(Scope::new(base, None)),
        }
    }

    /// Persistent nodes that must exist before entering `scope`, outermost first
    pub fn ancestors(&self, scope: &Scope) -> Vec<String> {
        let mut paths = Vec::new();
        let mut current = String::new();
        for segment in scope.path()[1..].split('/') {
            current.push('/');
            current.push_str(segment);
            paths.push(current.clone());
        }
        paths
    }

    /// Nodes the final leaver of `scope` deletes after its own entry and the
    /// marker, innermost first
    ///
    /// Plain and double barriers keep the shared root. Restricted barriers
    /// remove the subgroup and root. Nested barriers remove the stage after
    /// every stage and the subgroup and root only after the final one.
    pub fn cascade(&self, scope: &Scope, is_final_stage: bool) -> Vec<String> {
        match self.variant {
            Variant::Plain | Variant::Double => Vec::new(),
            Variant::Restricted => self
                .subgroup_path()
                .into_iter()
                .chain(std::iter::once(self.root.clone()))
                .collect(),
            Variant::Nested => {
                let mut paths = vec![scope.path().to_string()];
                if is_final_stage {
                    paths.extend(self.subgroup_path());
                    paths.push(self.root.clone());
                }
                paths
            }
        }
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
