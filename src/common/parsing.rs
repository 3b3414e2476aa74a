// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, B256, Selector};
use std::str::FromStr;

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn parse_hex_bytes(s: &str) -> Option<Vec<u8>> {
    hex::decode(strip_0x(s.trim())).ok()
}

pub fn parse_b256_hex(s: &str) -> Option<B256> {
    let bytes = parse_hex_bytes(s)?;
    if bytes.len() != 32 {
        return None;
    }
    Some(B256::from_slice(&bytes))
}

pub fn parse_selector_hex(s: &str) -> Option<Selector> {
    let bytes = parse_hex_bytes(s)?;
    if bytes.len() != 4 {
        return None;
    }
    Some(Selector::from_slice(&bytes))
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    Address::from_str(strip_0x(s.trim())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsers_accept_lower_and_upper_prefixes() {
        assert_eq!(parse_hex_bytes("0Xabcd"), Some(vec![0xab, 0xcd]));
        assert_eq!(parse_hex_bytes("abcd"), Some(vec![0xab, 0xcd]));
        assert_eq!(
            parse_selector_hex("0XA8EAC4B2"),
            Some(Selector::from([0xa8, 0xea, 0xc4, 0xb2]))
        );
    }

    #[test]
    fn length_checked_parsers_reject_wrong_sizes() {
        assert!(parse_selector_hex("0xa8eac4").is_none());
        assert!(parse_selector_hex("0xa8eac4b200").is_none());
        assert!(parse_b256_hex("0x1234").is_none());
        assert!(parse_b256_hex(&format!("0x{}", "11".repeat(32))).is_some());
        assert!(parse_address_hex("0xnothex").is_none());
    }
}
