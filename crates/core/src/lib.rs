// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! zb-core: Core types for the zkbarrier client
//!
//! This crate provides:
//! - Barrier variants and the namespace path layout they imply
//! - Participant entry naming and tie-break ordering
//! - The session-local notification channel fed by watch callbacks
//! - TOML configuration

pub mod config;
pub mod entry;
pub mod layout;
pub mod names;
pub mod notify;
pub mod variant;

pub use config::{BarrierConfig, ConfigError};
pub use entry::{participants, EntryName, EntryNameError};
pub use layout::{validate_name, validate_root, BarrierLayout, LayoutError, Scope, READY_MARKER};
pub use names::{resolve_participant, NameSource, NumberedNames, RandomNames};
pub use notify::{NotificationChannel, Notifier, WatchEvent, WatchKind};
pub use variant::{Variant, VariantParseError};
