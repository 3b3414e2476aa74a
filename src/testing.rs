// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! In-memory doubles for the chain and relay seams.

use crate::app::config::{ActionConfig, Endpoints, GasPolicy, Network, RaceConfig};
use crate::common::error::AppError;
use crate::domain::constants::{DEFAULT_TARGET_CONTRACT, GWEI};
use crate::domain::types::{
    Bundle, BundleSubmission, InclusionStatus, TransactionRecord, TriggerPattern,
};
use crate::network::chain::ChainReader;
use crate::network::relay::BundleRelay;
use crate::network::subscription::SubscriptionRequest;
use alloy::primitives::{Address, B256, Bytes, U256, fixed_bytes};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Sepolia run configuration with a throwaway key and dummy endpoints.
pub fn race_config() -> RaceConfig {
    let wallet = PrivateKeySigner::random();
    RaceConfig {
        network: Network::Sepolia,
        endpoints: Endpoints {
            rpc_url: "http://127.0.0.1:1".into(),
            ws_url: "ws://127.0.0.1:1".into(),
            relay_url: "http://127.0.0.1:1".into(),
        },
        bundle_signer: wallet.clone(),
        wallet,
        pattern: TriggerPattern::new(DEFAULT_TARGET_CONTRACT, fixed_bytes!("a8eac4b2")),
        action: ActionConfig {
            calldata: Bytes::from(vec![0x03, 0x82, 0x5e, 0x4e]),
            value: U256::from(10_000_000_000_000_000u64),
        },
        gas: GasPolicy {
            gas_limit: 200_000,
            max_fee_per_gas: 10 * GWEI,
            max_priority_fee_per_gas: 5 * GWEI,
        },
        subscription: SubscriptionRequest::hashes_only(),
        include_trigger_in_bundle: false,
        probe_value: None,
        inclusion_timeout: Duration::from_secs(30),
        inclusion_poll: Duration::from_millis(50),
        max_runtime: Duration::from_secs(60),
        max_concurrent_races: None,
        intake_capacity: 16,
        dry_run: true,
    }
}

pub fn record(hash: B256, to: Option<Address>, input: &[u8]) -> TransactionRecord {
    TransactionRecord {
        hash,
        from: Address::from([0x0f; 20]),
        to,
        input: Bytes::copy_from_slice(input),
        chain_id: Some(11_155_111),
        value: U256::ZERO,
    }
}

pub struct MockChain {
    block: AtomicU64,
    chain_id: u64,
    txs: DashMap<B256, TransactionRecord>,
    raw: DashMap<B256, Bytes>,
    receipts: DashMap<B256, u64>,
    nonces: DashMap<Address, u64>,
    fail_lookups: AtomicBool,
    pub lookups: AtomicU64,
    pub nonce_reads: AtomicU64,
    pub block_reads: AtomicU64,
}

impl MockChain {
    pub fn new(block: u64) -> Self {
        Self {
            block: AtomicU64::new(block),
            chain_id: 11_155_111,
            txs: DashMap::new(),
            raw: DashMap::new(),
            receipts: DashMap::new(),
            nonces: DashMap::new(),
            fail_lookups: AtomicBool::new(false),
            lookups: AtomicU64::new(0),
            nonce_reads: AtomicU64::new(0),
            block_reads: AtomicU64::new(0),
        }
    }

    pub fn add_tx(&self, record: TransactionRecord) {
        self.txs.insert(record.hash, record);
    }

    pub fn add_raw(&self, hash: B256, raw: Bytes) {
        self.raw.insert(hash, raw);
    }

    pub fn add_receipt(&self, hash: B256, block: u64) {
        self.receipts.insert(hash, block);
    }

    pub fn set_block(&self, block: u64) {
        self.block.store(block, Ordering::SeqCst);
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.nonces.insert(address, nonce);
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn block_number(&self) -> Result<u64, AppError> {
        self.block_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.block.load(Ordering::SeqCst))
    }

    async fn chain_id(&self) -> Result<u64, AppError> {
        Ok(self.chain_id)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, AppError> {
        self.nonce_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.nonces.get(&address).map(|n| *n).unwrap_or(0))
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionRecord>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::Connection("lookup failed".into()));
        }
        Ok(self.txs.get(&hash).map(|r| r.clone()))
    }

    async fn raw_transaction_by_hash(&self, hash: B256) -> Result<Option<Bytes>, AppError> {
        Ok(self.raw.get(&hash).map(|r| r.clone()))
    }

    async fn receipt_block(&self, hash: B256) -> Result<Option<u64>, AppError> {
        Ok(self.receipts.get(&hash).map(|b| *b))
    }
}

#[derive(Debug, Clone)]
pub enum RelayBehavior {
    Resolve(InclusionStatus),
    /// The inclusion wait never completes.
    Hang,
    RejectSend,
}

pub struct MockRelay {
    behavior: RelayBehavior,
    pub bundles: Mutex<Vec<Bundle>>,
}

impl MockRelay {
    pub fn new(behavior: RelayBehavior) -> Self {
        Self {
            behavior,
            bundles: Mutex::new(Vec::new()),
        }
    }

    pub fn submitted(&self) -> Vec<Bundle> {
        self.bundles.lock().expect("bundles lock").clone()
    }
}

#[async_trait]
impl BundleRelay for MockRelay {
    async fn send_bundle(&self, bundle: &Bundle) -> Result<BundleSubmission, AppError> {
        self.bundles.lock().expect("bundles lock").push(bundle.clone());
        if matches!(self.behavior, RelayBehavior::RejectSend) {
            return Err(AppError::Relay {
                relay: "mock".into(),
                message: "rejected".into(),
            });
        }
        Ok(BundleSubmission::from_bundle(bundle, Some("0xmock".into())))
    }

    async fn wait_for_inclusion(
        &self,
        _submission: &BundleSubmission,
    ) -> Result<InclusionStatus, AppError> {
        match &self.behavior {
            RelayBehavior::Resolve(status) => Ok(*status),
            RelayBehavior::Hang | RelayBehavior::RejectSend => {
                std::future::pending::<()>().await;
                Ok(InclusionStatus::BlockPassedWithoutInclusion)
            }
        }
    }
}
