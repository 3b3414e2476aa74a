// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use alloy::primitives::{Bytes, U256};
use alloy::sol;

sol! {
    interface PresaleNft {
        function enablePresale() external;
    }
}

/// Selector the deployed presale contract dispatches its mint entry on.
/// It does not correspond to `presale(uint256)` (`0xe6ab1434`).
pub const PRESALE_SELECTOR: [u8; 4] = [0x03, 0x82, 0x5e, 0x4e];

/// `PRESALE_SELECTOR` followed by `amount` as one big-endian word.
pub fn presale_calldata(amount: U256) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&PRESALE_SELECTOR);
    data.extend_from_slice(&amount.to_be_bytes::<32>());
    data.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::hex;
    use alloy::sol_types::SolCall;

    #[test]
    fn selectors_match_deployed_contract() {
        assert_eq!(PresaleNft::enablePresaleCall::SELECTOR, [0xa8, 0xea, 0xc4, 0x92]);
        assert_eq!(PRESALE_SELECTOR, [0x03, 0x82, 0x5e, 0x4e]);
    }

    #[test]
    fn presale_calldata_is_selector_and_amount_word() {
        let data = presale_calldata(U256::from(1u64));
        assert_eq!(
            hex::encode(&data),
            "03825e4e0000000000000000000000000000000000000000000000000000000000000001"
        );
        let big = presale_calldata(U256::from(0x0102u64));
        assert_eq!(big.len(), 36);
        assert_eq!(&big[34..], &[0x01, 0x02]);
    }
}
