// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::app::config::RaceConfig;
use crate::common::error::AppError;
use crate::domain::constants::TRANSFER_GAS_LIMIT;
use crate::domain::types::{Bundle, CandidateTransaction, SignedTransaction, TransactionRecord};
use crate::network::chain::ChainReader;
use crate::network::relay::{BundleEntry, sign_bundle};
use alloy::primitives::{Bytes, U256};
use std::sync::Arc;

/// Builds the competing transaction and wraps it into a single-block bundle.
/// Nonce and block height are read at call time, every time.
#[derive(Clone)]
pub struct BundleComposer {
    config: Arc<RaceConfig>,
}

impl BundleComposer {
    pub fn new(config: Arc<RaceConfig>) -> Self {
        Self { config }
    }

    pub async fn target_block(&self, chain: &dyn ChainReader) -> Result<u64, AppError> {
        Ok(chain.block_number().await? + 1)
    }

    pub async fn compose(
        &self,
        trigger: &TransactionRecord,
        chain: &dyn ChainReader,
    ) -> Result<CandidateTransaction, AppError> {
        let cfg = &self.config;
        let nonce = chain.transaction_count(cfg.wallet_address()).await?;
        let chain_id = match trigger.chain_id {
            Some(id) => id,
            None => chain.chain_id().await?,
        };

        Ok(CandidateTransaction {
            to: trigger.to.unwrap_or(cfg.pattern.contract),
            input: cfg.action.calldata.clone(),
            value: cfg.action.value,
            gas_limit: cfg.gas.gas_limit,
            max_fee_per_gas: cfg.gas.max_fee_per_gas,
            max_priority_fee_per_gas: cfg.gas.max_priority_fee_per_gas,
            nonce,
            chain_id,
        })
    }

    pub async fn compose_bundle(
        &self,
        trigger: &TransactionRecord,
        candidate: CandidateTransaction,
        target_block: u64,
        chain: &dyn ChainReader,
    ) -> Result<Bundle, AppError> {
        let mut entries = Vec::with_capacity(2);
        if self.config.include_trigger_in_bundle {
            let raw = chain
                .raw_transaction_by_hash(trigger.hash)
                .await?
                .ok_or_else(|| AppError::Validation {
                    field: "trigger".into(),
                    message: "trigger raw tx unavailable".into(),
                })?;
            entries.push(BundleEntry::Signed(SignedTransaction {
                hash: trigger.hash,
                raw,
            }));
        }
        entries.push(BundleEntry::Unsigned {
            signer: &self.config.wallet,
            tx: candidate,
        });
        sign_bundle(entries, target_block)
    }

    /// Self-transfer used to check relay connectivity at startup.
    pub async fn compose_probe(
        &self,
        value: U256,
        chain: &dyn ChainReader,
    ) -> Result<Bundle, AppError> {
        let cfg = &self.config;
        let me = cfg.wallet_address();
        let nonce = chain.transaction_count(me).await?;
        let chain_id = chain.chain_id().await?;
        let target_block = self.target_block(chain).await?;
        let probe = CandidateTransaction {
            to: me,
            input: Bytes::new(),
            value,
            gas_limit: TRANSFER_GAS_LIMIT,
            max_fee_per_gas: cfg.gas.max_fee_per_gas,
            max_priority_fee_per_gas: cfg.gas.max_priority_fee_per_gas,
            nonce,
            chain_id,
        };
        sign_bundle(
            vec![BundleEntry::Unsigned {
                signer: &cfg.wallet,
                tx: probe,
            }],
            target_block,
        )
    }
}
