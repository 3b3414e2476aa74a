// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, B256, Bytes, Selector, U256};
use std::fmt;

pub const EIP1559_TX_TYPE: u8 = 2;

/// Contract + 4-byte selector identifying the trigger call. Fixed for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerPattern {
    pub contract: Address,
    pub selector: Selector,
}

impl TriggerPattern {
    pub fn new(contract: Address, selector: Selector) -> Self {
        Self { contract, selector }
    }

    /// Raw byte-prefix comparison over the call input.
    pub fn matches(&self, input: &[u8]) -> bool {
        input.len() >= 4 && input[..4] == self.selector[..]
    }
}

/// Resolved pending transaction, held only for one match decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub input: Bytes,
    pub chain_id: Option<u64>,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched(TransactionRecord),
    NotMatched,
    Unresolvable,
}

/// Unsigned EIP-1559 fields for the transaction we want in the next block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTransaction {
    pub to: Address,
    pub input: Bytes,
    pub value: U256,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub nonce: u64,
    pub chain_id: u64,
}

impl CandidateTransaction {
    pub fn tx_type(&self) -> u8 {
        EIP1559_TX_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: B256,
    pub raw: Bytes,
}

/// Ordered signed transactions for exactly one target block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub target_block: u64,
    pub transactions: Vec<SignedTransaction>,
    pub signer: Address,
    pub signer_nonce: u64,
}

impl Bundle {
    pub fn tx_hashes(&self) -> Vec<B256> {
        self.transactions.iter().map(|tx| tx.hash).collect()
    }

    pub fn byte_len(&self) -> usize {
        self.transactions.iter().map(|tx| tx.raw.len()).sum()
    }
}

/// What the relay handed back for a submitted bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSubmission {
    pub bundle_hash: Option<String>,
    pub target_block: u64,
    pub tx_hashes: Vec<B256>,
    pub signer: Address,
    pub signer_nonce: u64,
}

impl BundleSubmission {
    pub fn from_bundle(bundle: &Bundle, bundle_hash: Option<String>) -> Self {
        Self {
            bundle_hash,
            target_block: bundle.target_block,
            tx_hashes: bundle.tx_hashes(),
            signer: bundle.signer,
            signer_nonce: bundle.signer_nonce,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionStatus {
    Included,
    BlockPassedWithoutInclusion,
    AccountNonceTooHigh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    Included,
    TimedOut,
    Failed(String),
}

impl fmt::Display for RaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceOutcome::Included => f.write_str("included"),
            RaceOutcome::TimedOut => f.write_str("timed_out"),
            RaceOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Terminal state of one inbound hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashOutcome {
    NotMatched,
    Unresolvable,
    Raced(RaceOutcome),
}
