// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod app;
pub mod common;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod services;

#[cfg(test)]
mod testing;

// Short paths for the most used modules.
pub use infrastructure::network;
pub use services::race;
