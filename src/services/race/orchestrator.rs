// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::RaceConfig;
use crate::common::error::AppError;
use crate::common::seen_cache::SeenCache;
use crate::domain::types::{
    Bundle, HashOutcome, InclusionStatus, MatchResult, RaceOutcome, TransactionRecord,
};
use crate::network::chain::SharedChainReader;
use crate::network::relay::SharedBundleRelay;
use crate::network::subscription::PendingTxSubscription;
use crate::services::race::composer::BundleComposer;
use crate::services::race::matcher::TriggerMatcher;
use crate::services::race::stats::{RaceStats, RaceStatsSnapshot};
use alloy::primitives::B256;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

#[cfg(test)]
const SEEN_MAX: usize = 64;
#[cfg(not(test))]
const SEEN_MAX: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceState {
    Idle,
    Subscribing,
    /// `detecting == false` is the degraded mode after a failed subscription.
    Listening { detecting: bool },
    Terminated,
}

/// Everything a single race attempt needs. Cloned into each spawned task.
#[derive(Clone)]
pub struct RaceContext {
    config: Arc<RaceConfig>,
    chain: SharedChainReader,
    relay: SharedBundleRelay,
    composer: BundleComposer,
    stats: Arc<RaceStats>,
    permits: Option<Arc<Semaphore>>,
}

impl RaceContext {
    pub fn new(config: Arc<RaceConfig>, chain: SharedChainReader, relay: SharedBundleRelay) -> Self {
        let permits = config
            .max_concurrent_races
            .map(|n| Arc::new(Semaphore::new(n)));
        Self {
            composer: BundleComposer::new(config.clone()),
            config,
            chain,
            relay,
            stats: Arc::new(RaceStats::default()),
            permits,
        }
    }

    pub fn stats(&self) -> Arc<RaceStats> {
        self.stats.clone()
    }

    /// Drive one hash to its terminal outcome.
    pub async fn race(&self, hash: B256) -> HashOutcome {
        let _permit = match &self.permits {
            Some(sem) => match sem.clone().acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    let outcome = HashOutcome::Raced(RaceOutcome::Failed(e.to_string()));
                    self.stats.record(&outcome);
                    return outcome;
                }
            },
            None => None,
        };

        let outcome =
            match TriggerMatcher::classify(hash, self.chain.as_ref(), &self.config.pattern).await {
                MatchResult::NotMatched => HashOutcome::NotMatched,
                MatchResult::Unresolvable => HashOutcome::Unresolvable,
                MatchResult::Matched(trigger) => HashOutcome::Raced(self.race_trigger(&trigger).await),
            };
        self.stats.record(&outcome);
        if let HashOutcome::Raced(result) = &outcome {
            tracing::info!(target: "race", tx = %hash, outcome = %result, "Race finished");
        }
        outcome
    }

    async fn race_trigger(&self, trigger: &TransactionRecord) -> RaceOutcome {
        let bundle = match self.build_bundle(trigger).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(target: "race", tx = %trigger.hash, error = %e, "Could not build bundle");
                return RaceOutcome::Failed(e.to_string());
            }
        };

        let submission = match self.relay.send_bundle(&bundle).await {
            Ok(submission) => submission,
            Err(e) => {
                tracing::warn!(target: "race", tx = %trigger.hash, error = %e, "Bundle submission failed");
                return RaceOutcome::Failed(e.to_string());
            }
        };
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            target: "race",
            trigger = %trigger.hash,
            target_block = submission.target_block,
            bundle_hash = ?submission.bundle_hash,
            "Bundle in flight; waiting for inclusion"
        );

        let outcome = match timeout(
            self.config.inclusion_timeout,
            self.relay.wait_for_inclusion(&submission),
        )
        .await
        {
            Ok(Ok(InclusionStatus::Included)) => RaceOutcome::Included,
            Ok(Ok(InclusionStatus::BlockPassedWithoutInclusion)) => {
                RaceOutcome::Failed("block passed without inclusion".into())
            }
            Ok(Ok(InclusionStatus::AccountNonceTooHigh)) => {
                RaceOutcome::Failed("account nonce too high".into())
            }
            Ok(Err(e)) => RaceOutcome::Failed(e.to_string()),
            Err(_) => RaceOutcome::TimedOut,
        };

        if outcome != RaceOutcome::Included {
            match self.relay.bundle_stats(&submission).await {
                Ok(Some(stats)) => {
                    tracing::info!(target: "race", bundle_hash = ?submission.bundle_hash, %stats, "Bundle stats");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(target: "race", error = %e, "Bundle stats unavailable");
                }
            }
        }
        outcome
    }

    async fn build_bundle(&self, trigger: &TransactionRecord) -> Result<Bundle, AppError> {
        let chain = self.chain.as_ref();
        let candidate = self.composer.compose(trigger, chain).await?;
        let target_block = self.composer.target_block(chain).await?;
        self.composer
            .compose_bundle(trigger, candidate, target_block, chain)
            .await
    }

    /// One-shot relay connectivity check. Never fails the run.
    pub async fn send_probe(&self) {
        let Some(value) = self.config.probe_value else {
            return;
        };
        let bundle = match self.composer.compose_probe(value, self.chain.as_ref()).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(target: "race", error = %e, "Probe bundle could not be built");
                return;
            }
        };
        match self.relay.send_bundle(&bundle).await {
            Ok(submission) => tracing::info!(
                target: "race",
                target_block = submission.target_block,
                bundle_hash = ?submission.bundle_hash,
                "Probe bundle submitted"
            ),
            Err(e) => tracing::warn!(target: "race", error = %e, "Probe bundle rejected"),
        }
    }
}

pub struct RaceOrchestrator {
    ctx: RaceContext,
    seen: SeenCache<B256>,
    shutdown: CancellationToken,
    state: Mutex<RaceState>,
}

impl RaceOrchestrator {
    pub fn new(ctx: RaceContext, shutdown: CancellationToken) -> Self {
        Self {
            ctx,
            seen: SeenCache::new(SEEN_MAX),
            shutdown,
            state: Mutex::new(RaceState::Idle),
        }
    }

    pub fn state(&self) -> RaceState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, next: RaceState) {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(target: "race", from = ?*guard, to = ?next, "State change");
        *guard = next;
    }

    /// Subscribe, probe, then race every inbound hash until the run ends.
    pub async fn run(&self) -> Result<RaceStatsSnapshot, AppError> {
        let cfg = self.ctx.config.clone();
        self.transition(RaceState::Subscribing);

        let (tx, rx) = mpsc::channel(cfg.intake_capacity);
        let intake_token = self.shutdown.child_token();
        let intake = match PendingTxSubscription::open(&cfg.endpoints.ws_url, &cfg.subscription).await
        {
            Ok(sub) => {
                let token = intake_token.clone();
                Some(tokio::spawn(async move { sub.forward(tx, token).await }))
            }
            Err(e) => {
                tracing::error!(
                    target: "race",
                    error = %e,
                    "Subscription failed; continuing without live detection"
                );
                None
            }
        };

        self.ctx.send_probe().await;

        self.transition(RaceState::Listening {
            detecting: intake.is_some(),
        });
        tracing::info!(
            target: "race",
            contract = %cfg.pattern.contract,
            selector = %cfg.pattern.selector,
            detecting = intake.is_some(),
            max_runtime_secs = cfg.max_runtime.as_secs(),
            "Listening for trigger"
        );

        self.listen(rx, intake.is_some()).await;

        intake_token.cancel();
        if let Some(handle) = intake {
            match handle.await {
                Ok(Err(e)) => tracing::warn!(target: "race", error = %e, "Subscription ended with error"),
                Err(e) => tracing::warn!(target: "race", error = %e, "Subscription task join failed"),
                Ok(Ok(())) => {}
            }
        }

        self.transition(RaceState::Terminated);
        self.ctx.stats.log_summary();
        Ok(self.ctx.stats.snapshot())
    }

    async fn listen(&self, mut rx: mpsc::Receiver<B256>, mut intake_open: bool) {
        let deadline = sleep(self.ctx.config.max_runtime);
        tokio::pin!(deadline);
        let mut races: JoinSet<HashOutcome> = JoinSet::new();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!(target: "race", "Shutdown requested; stopping race loop");
                    break;
                }
                _ = &mut deadline => {
                    tracing::info!(target: "race", "Maximum runtime reached; stopping race loop");
                    break;
                }
                joined = races.join_next(), if !races.is_empty() => {
                    if let Some(Err(e)) = joined {
                        tracing::warn!(target: "race", error = %e, "Race task failed");
                    }
                }
                maybe_hash = rx.recv(), if intake_open => {
                    let Some(hash) = maybe_hash else {
                        tracing::warn!(target: "race", "Subscription intake closed; detection disabled");
                        intake_open = false;
                        self.transition(RaceState::Listening { detecting: false });
                        continue;
                    };
                    self.ctx.stats.seen.fetch_add(1, Ordering::Relaxed);
                    if !self.seen.remember(hash).await {
                        self.ctx.stats.duplicates.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }
                    let ctx = self.ctx.clone();
                    races.spawn(async move { ctx.race(hash).await });
                }
            }
        }

        if !races.is_empty() {
            tracing::info!(target: "race", in_flight = races.len(), "Aborting in-flight races");
        }
        races.shutdown().await;
    }
}
