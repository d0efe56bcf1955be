// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! zkbarrier synchronization engine

mod entry;
mod error;
mod exit;
mod gate;
mod ops;
mod queue;
mod session;
mod stages;

pub use entry::EntryProtocol;
pub use error::BarrierError;
pub use exit::ExitProtocol;
pub use gate::Gate;
pub use queue::{WorkQueue, ELEMENT_PREFIX};
pub use session::BarrierSession;
pub use stages::StageController;
