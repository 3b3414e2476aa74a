// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod composer;
pub mod matcher;
pub mod orchestrator;
pub mod stats;

pub use orchestrator::{RaceContext, RaceOrchestrator, RaceState};
