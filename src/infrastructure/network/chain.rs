// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::types::TransactionRecord;
use crate::network::provider::{ConnectionFactory, HttpProvider};
use alloy::consensus::Transaction as ConsensusTx;
use alloy::network::TransactionResponse;
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::Transaction;
use async_trait::async_trait;
use std::sync::Arc;

/// Read side of the node. Shared by every race attempt; implementations must be cheap to call
/// concurrently.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn block_number(&self) -> Result<u64, AppError>;

    async fn chain_id(&self) -> Result<u64, AppError>;

    /// Confirmed transaction count ("nonce") of `address` at the latest block.
    async fn transaction_count(&self, address: Address) -> Result<u64, AppError>;

    async fn transaction_by_hash(&self, hash: B256)
    -> Result<Option<TransactionRecord>, AppError>;

    /// Signed EIP-2718 bytes of a transaction known to the node.
    async fn raw_transaction_by_hash(&self, hash: B256) -> Result<Option<Bytes>, AppError>;

    /// Block a transaction was mined in, if a receipt exists.
    async fn receipt_block(&self, hash: B256) -> Result<Option<u64>, AppError>;
}

pub type SharedChainReader = Arc<dyn ChainReader>;

#[derive(Clone)]
pub struct RpcChainClient {
    provider: HttpProvider,
}

impl RpcChainClient {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    pub fn connect(rpc_url: &str) -> Result<Self, AppError> {
        Ok(Self::new(ConnectionFactory::http(rpc_url)?))
    }
}

pub fn record_from_rpc(tx: &Transaction) -> TransactionRecord {
    TransactionRecord {
        hash: TransactionResponse::tx_hash(tx),
        from: TransactionResponse::from(tx),
        to: ConsensusTx::to(tx),
        input: ConsensusTx::input(tx).clone(),
        chain_id: ConsensusTx::chain_id(tx),
        value: ConsensusTx::value(tx),
    }
}

#[async_trait]
impl ChainReader for RpcChainClient {
    async fn block_number(&self) -> Result<u64, AppError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| AppError::Connection(format!("Failed to fetch block number: {}", e)))
    }

    async fn chain_id(&self) -> Result<u64, AppError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| AppError::Connection(format!("Failed to fetch chain id: {}", e)))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, AppError> {
        self.provider
            .get_transaction_count(address)
            .latest()
            .await
            .map_err(|e| AppError::Connection(format!("Failed to fetch nonce: {}", e)))
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionRecord>, AppError> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| AppError::Connection(format!("Failed to fetch tx {hash:#x}: {}", e)))?;
        Ok(tx.as_ref().map(record_from_rpc))
    }

    async fn raw_transaction_by_hash(&self, hash: B256) -> Result<Option<Bytes>, AppError> {
        self.provider
            .get_raw_transaction_by_hash(hash)
            .await
            .map_err(|e| AppError::Connection(format!("Failed to fetch raw tx {hash:#x}: {}", e)))
    }

    async fn receipt_block(&self, hash: B256) -> Result<Option<u64>, AppError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| {
                AppError::Connection(format!("Failed to fetch receipt {hash:#x}: {}", e))
            })?;
        Ok(receipt.and_then(|r| r.block_number))
    }
}
