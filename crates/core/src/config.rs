// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier client configuration
//!
//! Loaded from an optional TOML file; the CLI overrides individual fields
//! from flags and validates the result before connecting.

use crate::layout::{validate_name, BarrierLayout, LayoutError};
use crate::notify::DEFAULT_CAPACITY;
use crate::variant::Variant;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("endpoint must not be empty")]
    EmptyEndpoint,
    #[error("quorum must be at least 1")]
    ZeroQuorum,
    #[error("notification capacity must be at least 1")]
    ZeroCapacity,
    #[error("nested barrier requires at least one stage")]
    NoStages,
    #[error("{0} barrier does not take stages")]
    UnexpectedStages(Variant),
    #[error("duplicate stage '{0}'")]
    DuplicateStage(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Barrier client configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarrierConfig {
    /// Coordination service address, `host:port[,host:port...]`
    pub endpoint: String,
    /// Namespace path all barrier state lives under
    pub root: String,
    /// Number of participants required before anyone proceeds
    pub quorum: usize,
    pub variant: Variant,
    /// Subgroup name for restricted and nested barriers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup: Option<String>,
    /// Ordered stage names for nested barriers
    pub stages: Vec<String>,
    /// Participant name prefix; generated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    /// How long to wait for the first session before giving up
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Undelivered watch events buffered per session
    pub notify_capacity: usize,
    /// Simulated work between entering and leaving
    #[serde(with = "humantime_serde")]
    pub work: Duration,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:2181".to_string(),
            root: "/b1".to_string(),
            quorum: 2,
            variant: Variant::default(),
            subgroup: None,
            stages: Vec::new(),
            participant: None,
            connect_timeout: Duration::from_secs(10),
            notify_capacity: DEFAULT_CAPACITY,
            work: Duration::ZERO,
        }
    }
}

impl BarrierConfig {
    /// Parse configuration from TOML content; missing fields take defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Namespace layout implied by root, variant and subgroup
    pub fn layout(&self) -> Result<BarrierLayout, LayoutError> {
        BarrierLayout::new(self.variant, self.root.clone(), self.subgroup.clone())
    }

    /// Check every field that would otherwise fail after connecting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.quorum == 0 {
            return Err(ConfigError::ZeroQuorum);
        }
        if self.notify_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.layout()?;

        if let Some(participant) = &self.participant {
            validate_name(participant)?;
        }

        match (self.variant.is_staged(), self.stages.is_empty()) {
            (true, true) => return Err(ConfigError::NoStages),
            (false, false) => return Err(ConfigError::UnexpectedStages(self.variant)),
            _ => {}
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            validate_name(stage)?;
            if !seen.insert(stage.as_str()) {
                return Err(ConfigError::DuplicateStage(stage.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
