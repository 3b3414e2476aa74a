// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::domain::constants::{FLASHBOTS_MAX_BYTES, FLASHBOTS_MAX_TXS, RELAY_TIMEOUT_MS};
use crate::domain::types::{
    Bundle, BundleSubmission, CandidateTransaction, InclusionStatus, SignedTransaction,
};
use crate::network::chain::SharedChainReader;
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::eips::eip2930::AccessList;
use alloy::network::TxSignerSync;
use alloy::primitives::{B256, TxKind, keccak256};
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderValue;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Private submission channel. Bundles are all-or-nothing for one target block.
#[async_trait]
pub trait BundleRelay: Send + Sync {
    async fn send_bundle(&self, bundle: &Bundle) -> Result<BundleSubmission, AppError>;

    /// Resolves once the target block has been produced. Callers bound this with their own timeout.
    async fn wait_for_inclusion(
        &self,
        submission: &BundleSubmission,
    ) -> Result<InclusionStatus, AppError>;

    async fn bundle_stats(&self, _submission: &BundleSubmission) -> Result<Option<Value>, AppError> {
        Ok(None)
    }
}

pub type SharedBundleRelay = Arc<dyn BundleRelay>;

/// One leg of a bundle before signing.
pub enum BundleEntry<'a> {
    /// Someone else's already-signed transaction (e.g. the trigger).
    Signed(SignedTransaction),
    Unsigned {
        signer: &'a PrivateKeySigner,
        tx: CandidateTransaction,
    },
}

pub fn sign_candidate(
    signer: &PrivateKeySigner,
    candidate: &CandidateTransaction,
) -> Result<SignedTransaction, AppError> {
    let mut tx = TxEip1559 {
        chain_id: candidate.chain_id,
        nonce: candidate.nonce,
        max_priority_fee_per_gas: candidate.max_priority_fee_per_gas,
        max_fee_per_gas: candidate.max_fee_per_gas,
        gas_limit: candidate.gas_limit,
        to: TxKind::Call(candidate.to),
        value: candidate.value,
        access_list: AccessList::default(),
        input: candidate.input.clone(),
    };

    let sig = TxSignerSync::sign_transaction_sync(signer, &mut tx)
        .map_err(|e| AppError::Signing(format!("Sign tx failed: {}", e)))?;
    let signed: TxEnvelope = tx.into_signed(sig).into();
    Ok(SignedTransaction {
        hash: *signed.tx_hash(),
        raw: signed.encoded_2718().into(),
    })
}

/// Sign every unsigned leg and keep the given order. The last signed-by-us leg
/// provides the nonce used for "nonce too high" detection.
pub fn sign_bundle(entries: Vec<BundleEntry<'_>>, target_block: u64) -> Result<Bundle, AppError> {
    let mut transactions = Vec::with_capacity(entries.len());
    let mut ours = None;
    for entry in entries {
        match entry {
            BundleEntry::Signed(tx) => transactions.push(tx),
            BundleEntry::Unsigned { signer, tx } => {
                transactions.push(sign_candidate(signer, &tx)?);
                ours = Some((signer.address(), tx.nonce));
            }
        }
    }
    let (signer, signer_nonce) = ours.ok_or_else(|| {
        AppError::Signing("bundle needs at least one transaction signed by us".into())
    })?;
    Ok(Bundle {
        target_block,
        transactions,
        signer,
        signer_nonce,
    })
}

/// Flashbots computes the bundle hash as keccak over the concatenated tx hashes.
pub fn local_bundle_hash(bundle: &Bundle) -> B256 {
    let mut material = Vec::with_capacity(bundle.transactions.len() * 32);
    for tx in &bundle.transactions {
        material.extend_from_slice(tx.hash.as_slice());
    }
    keccak256(material)
}

pub fn send_bundle_payload(bundle: &Bundle) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_sendBundle",
        "params": [{
            "txs": bundle
                .transactions
                .iter()
                .map(|tx| format!("0x{}", hex::encode(&tx.raw)))
                .collect::<Vec<_>>(),
            "blockNumber": format!("0x{:x}", bundle.target_block),
        }]
    })
}

/// Verdict for a bundle once its target block exists.
pub async fn resolve_inclusion(
    chain: &SharedChainReader,
    submission: &BundleSubmission,
) -> Result<InclusionStatus, AppError> {
    let mut all_landed = !submission.tx_hashes.is_empty();
    for hash in &submission.tx_hashes {
        match chain.receipt_block(*hash).await? {
            Some(block) if block == submission.target_block => {}
            _ => {
                all_landed = false;
                break;
            }
        }
    }
    if all_landed {
        return Ok(InclusionStatus::Included);
    }

    let nonce = chain.transaction_count(submission.signer).await?;
    if nonce > submission.signer_nonce {
        Ok(InclusionStatus::AccountNonceTooHigh)
    } else {
        Ok(InclusionStatus::BlockPassedWithoutInclusion)
    }
}

pub struct FlashbotsRelay {
    chain: SharedChainReader,
    client: Client,
    relay_url: String,
    auth_signer: PrivateKeySigner,
    poll_interval: Duration,
    dry_run: bool,
}

impl FlashbotsRelay {
    pub fn new(
        chain: SharedChainReader,
        relay_url: String,
        auth_signer: PrivateKeySigner,
        poll_interval: Duration,
        dry_run: bool,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(RELAY_TIMEOUT_MS))
            .build()
            .map_err(|e| AppError::Config(format!("Relay HTTP client init failed: {}", e)))?;
        Ok(Self {
            chain,
            client,
            relay_url,
            auth_signer,
            poll_interval,
            dry_run,
        })
    }

    fn relay_error(&self, message: String) -> AppError {
        AppError::Relay {
            relay: self.relay_url.clone(),
            message,
        }
    }

    fn sign_request(&self, body_bytes: &[u8]) -> Result<String, AppError> {
        // EIP-191 signature over the hex string of keccak256(body), not over the raw hash.
        let message_hash = keccak256(body_bytes).to_string();
        let signature = self
            .auth_signer
            .sign_message_sync(message_hash.as_bytes())
            .map_err(|e| AppError::Signing(format!("Relay auth signing failed: {}", e)))?;
        Ok(format!(
            "{}:0x{}",
            self.auth_signer.address(),
            hex::encode(signature.as_bytes())
        ))
    }

    async fn post_signed(&self, payload: &Value) -> Result<Value, AppError> {
        let body_bytes =
            serde_json::to_vec(payload).map_err(|e| self.relay_error(e.to_string()))?;
        let sig_header = self.sign_request(&body_bytes)?;

        let resp = self
            .client
            .post(&self.relay_url)
            .header("Content-Type", "application/json")
            .header(
                "X-Flashbots-Signature",
                HeaderValue::from_str(&sig_header)
                    .map_err(|e| self.relay_error(format!("Signature header invalid: {}", e)))?,
            )
            .body(body_bytes)
            .send()
            .await
            .map_err(|e| self.relay_error(format!("POST failed: {}", e)))?;

        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(self.relay_error(format!("status {} body={}", status, body_text)));
        }
        let parsed: Value = serde_json::from_str(&body_text)
            .map_err(|e| self.relay_error(format!("undecodable response: {} body={}", e, body_text)))?;
        if let Some(err) = parsed.get("error") {
            return Err(self.relay_error(format!("rejected: {}", err)));
        }
        Ok(parsed)
    }

    fn extract_bundle_id(parsed: &Value) -> Option<String> {
        let result = parsed.get("result")?;
        if let Some(s) = result.as_str() {
            return Some(s.to_string());
        }
        let obj = result.as_object()?;
        for key in ["bundleHash", "bundle_hash", "hash", "bundleId", "uuid"] {
            if let Some(v) = obj.get(key).and_then(|v| v.as_str()) {
                return Some(v.to_string());
            }
        }
        None
    }
}

#[async_trait]
impl BundleRelay for FlashbotsRelay {
    async fn send_bundle(&self, bundle: &Bundle) -> Result<BundleSubmission, AppError> {
        let bundle_bytes = bundle.byte_len();
        if bundle.transactions.is_empty()
            || bundle.transactions.len() > FLASHBOTS_MAX_TXS
            || bundle_bytes > FLASHBOTS_MAX_BYTES
        {
            return Err(self.relay_error(format!(
                "Bundle outside Flashbots limits: {} txs, {} bytes (max {} tx / {} bytes)",
                bundle.transactions.len(),
                bundle_bytes,
                FLASHBOTS_MAX_TXS,
                FLASHBOTS_MAX_BYTES
            )));
        }

        if self.dry_run {
            let local = format!("{:#x}", local_bundle_hash(bundle));
            tracing::info!(
                target: "relay",
                block = bundle.target_block,
                txs = bundle.transactions.len(),
                bundle_hash = %local,
                "Dry-run: would send eth_sendBundle"
            );
            return Ok(BundleSubmission::from_bundle(bundle, Some(local)));
        }

        let parsed = self.post_signed(&send_bundle_payload(bundle)).await?;
        let bundle_hash = Self::extract_bundle_id(&parsed)
            .or_else(|| Some(format!("{:#x}", local_bundle_hash(bundle))));
        tracing::info!(
            target: "relay",
            relay = %self.relay_url,
            block = bundle.target_block,
            txs = bundle.transactions.len(),
            bundle_hash = ?bundle_hash,
            "Bundle submitted"
        );
        Ok(BundleSubmission::from_bundle(bundle, bundle_hash))
    }

    async fn wait_for_inclusion(
        &self,
        submission: &BundleSubmission,
    ) -> Result<InclusionStatus, AppError> {
        loop {
            match self.chain.block_number().await {
                Ok(head) if head >= submission.target_block => {
                    return resolve_inclusion(&self.chain, submission).await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(target: "relay", error = %e, "Head lookup failed while waiting for inclusion");
                }
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn bundle_stats(&self, submission: &BundleSubmission) -> Result<Option<Value>, AppError> {
        if self.dry_run {
            return Ok(None);
        }
        let Some(bundle_hash) = submission.bundle_hash.as_deref() else {
            return Ok(None);
        };
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "flashbots_getBundleStatsV2",
            "params": [{
                "bundleHash": bundle_hash,
                "blockNumber": format!("0x{:x}", submission.target_block),
            }]
        });
        let parsed = self.post_signed(&payload).await?;
        Ok(parsed.get("result").cloned())
    }
}
