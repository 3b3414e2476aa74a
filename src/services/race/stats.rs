// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::types::{HashOutcome, RaceOutcome};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RaceStats {
    pub seen: AtomicU64,
    pub duplicates: AtomicU64,
    pub not_matched: AtomicU64,
    pub unresolvable: AtomicU64,
    pub submitted: AtomicU64,
    pub included: AtomicU64,
    pub timed_out: AtomicU64,
    pub failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceStatsSnapshot {
    pub seen: u64,
    pub duplicates: u64,
    pub not_matched: u64,
    pub unresolvable: u64,
    pub submitted: u64,
    pub included: u64,
    pub timed_out: u64,
    pub failed: u64,
}

impl RaceStatsSnapshot {
    /// Hashes that reached a terminal outcome.
    pub fn terminal(&self) -> u64 {
        self.not_matched + self.unresolvable + self.included + self.timed_out + self.failed
    }
}

impl RaceStats {
    pub fn record(&self, outcome: &HashOutcome) {
        let counter = match outcome {
            HashOutcome::NotMatched => &self.not_matched,
            HashOutcome::Unresolvable => &self.unresolvable,
            HashOutcome::Raced(RaceOutcome::Included) => &self.included,
            HashOutcome::Raced(RaceOutcome::TimedOut) => &self.timed_out,
            HashOutcome::Raced(RaceOutcome::Failed(_)) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RaceStatsSnapshot {
        RaceStatsSnapshot {
            seen: self.seen.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            not_matched: self.not_matched.load(Ordering::Relaxed),
            unresolvable: self.unresolvable.load(Ordering::Relaxed),
            submitted: self.submitted.load(Ordering::Relaxed),
            included: self.included.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let s = self.snapshot();
        tracing::info!(
            target: "race",
            seen = s.seen,
            duplicates = s.duplicates,
            not_matched = s.not_matched,
            unresolvable = s.unresolvable,
            submitted = s.submitted,
            included = s.included,
            timed_out = s.timed_out,
            failed = s.failed,
            "Race stats"
        );
    }
}
