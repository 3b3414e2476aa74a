// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::types::{MatchResult, TriggerPattern};
use crate::network::chain::ChainReader;
use alloy::primitives::B256;

pub struct TriggerMatcher;

impl TriggerMatcher {
    /// Resolve `hash` and test it against `pattern`. Lookup failures never propagate.
    pub async fn classify(
        hash: B256,
        chain: &dyn ChainReader,
        pattern: &TriggerPattern,
    ) -> MatchResult {
        let record = match chain.transaction_by_hash(hash).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(target: "matcher", tx = %hash, "Pending tx not found");
                return MatchResult::Unresolvable;
            }
            Err(e) => {
                tracing::debug!(target: "matcher", tx = %hash, error = %e, "Pending tx lookup failed");
                return MatchResult::Unresolvable;
            }
        };

        if pattern.matches(&record.input) {
            tracing::info!(
                target: "matcher",
                tx = %hash,
                from = %record.from,
                to = ?record.to,
                "Trigger transaction detected"
            );
            MatchResult::Matched(record)
        } else {
            MatchResult::NotMatched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockChain, record};
    use alloy::primitives::{Address, address, fixed_bytes};

    fn pattern() -> TriggerPattern {
        TriggerPattern::new(
            address!("a4010fa5a816747f9eba1a60271280beaae28f10"),
            fixed_bytes!("a8eac4b2"),
        )
    }

    #[tokio::test]
    async fn enable_presale_call_matches() {
        let chain = MockChain::new(1);
        let hash = B256::from([1u8; 32]);
        chain.add_tx(record(hash, Some(pattern().contract), &[0xa8, 0xea, 0xc4, 0xb2]));
        assert!(matches!(
            TriggerMatcher::classify(hash, &chain, &pattern()).await,
            MatchResult::Matched(r) if r.hash == hash
        ));
    }

    #[tokio::test]
    async fn other_selector_does_not_match() {
        let chain = MockChain::new(1);
        let presale = B256::from([2u8; 32]);
        let short = B256::from([5u8; 32]);
        chain.add_tx(record(presale, Some(pattern().contract), &[0x03, 0x82, 0x5e, 0x4e, 0, 1]));
        chain.add_tx(record(short, Some(pattern().contract), &[0xa8, 0xea, 0xc4]));
        assert_eq!(
            TriggerMatcher::classify(presale, &chain, &pattern()).await,
            MatchResult::NotMatched
        );
        assert_eq!(
            TriggerMatcher::classify(short, &chain, &pattern()).await,
            MatchResult::NotMatched
        );
    }

    #[tokio::test]
    async fn selector_match_ignores_destination() {
        let chain = MockChain::new(1);
        let elsewhere = B256::from([3u8; 32]);
        let creation = B256::from([6u8; 32]);
        chain.add_tx(record(
            elsewhere,
            Some(Address::from([9u8; 20])),
            &[0xa8, 0xea, 0xc4, 0xb2],
        ));
        chain.add_tx(record(creation, None, &[0xa8, 0xea, 0xc4, 0xb2, 0x00]));
        assert!(matches!(
            TriggerMatcher::classify(elsewhere, &chain, &pattern()).await,
            MatchResult::Matched(r) if r.hash == elsewhere
        ));
        assert!(matches!(
            TriggerMatcher::classify(creation, &chain, &pattern()).await,
            MatchResult::Matched(r) if r.hash == creation
        ));
    }

    #[tokio::test]
    async fn unknown_or_failing_lookup_is_unresolvable() {
        let chain = MockChain::new(1);
        assert_eq!(
            TriggerMatcher::classify(B256::from([4u8; 32]), &chain, &pattern()).await,
            MatchResult::Unresolvable
        );
        chain.fail_lookups(true);
        assert_eq!(
            TriggerMatcher::classify(B256::from([4u8; 32]), &chain, &pattern()).await,
            MatchResult::Unresolvable
        );
    }
}
