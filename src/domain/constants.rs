// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_SEPOLIA: u64 = 11_155_111;

pub const FLASHBOTS_RELAY_MAINNET: &str = "https://relay.flashbots.net";
pub const FLASHBOTS_RELAY_SEPOLIA: &str = "https://relay-sepolia.flashbots.net";

/// Alchemy-style pending stream; the topic is a provider extension of `eth_subscribe`.
pub const PENDING_TX_TOPIC: &str = "alchemy_pendingTransactions";
pub const SUBSCRIBE_METHOD: &str = "eth_subscribe";

// =============================================================================
// PRESALE TARGET
// =============================================================================

pub const DEFAULT_TARGET_CONTRACT: Address = address!("a4010fa5a816747f9eba1a60271280beaae28f10");
pub const DEFAULT_PRESALE_AMOUNT: u64 = 1;
// 0.01 ETH
pub const DEFAULT_ACTION_VALUE_WEI: u128 = 10_000_000_000_000_000;

// =============================================================================
// GAS & TIMING POLICY
// =============================================================================

pub const GWEI: u128 = 1_000_000_000;
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;
pub const DEFAULT_MAX_FEE_GWEI: u64 = 10;
pub const DEFAULT_PRIORITY_FEE_GWEI: u64 = 5;
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;
// 0.0000001 ETH
pub const DEFAULT_PROBE_VALUE_WEI: u128 = 100_000_000_000;

pub const DEFAULT_INCLUSION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_INCLUSION_POLL_MS: u64 = 1_000;
pub const DEFAULT_MAX_RUNTIME_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_INTAKE_CAPACITY: usize = 1_024;

// =============================================================================
// RELAY LIMITS
// =============================================================================

pub const FLASHBOTS_MAX_TXS: usize = 100;
pub const FLASHBOTS_MAX_BYTES: usize = 300_000;
pub const RELAY_TIMEOUT_MS: u64 = 2_500;
