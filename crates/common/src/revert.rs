//! Decoding of structured revert payloads.

use alloy_sol_types::{Panic, Revert, SolError};

/// Decodes the revert reason carried by a failed call's return data.
///
/// Understands the two standard Solidity payloads, `Error(string)` and
/// `Panic(uint256)`. Custom errors and bare reverts carry no standard
/// human-readable reason and decode to `None`.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    if let Ok(revert) = Revert::abi_decode(data) {
        return Some(revert.reason);
    }
    if let Ok(panic) = Panic::abi_decode(data) {
        return Some(panic.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn decodes_error_string() {
        let data = Revert::from("ERC721: invalid token ID").abi_encode();
        assert_eq!(decode_revert_reason(&data), Some("ERC721: invalid token ID".to_string()));
    }

    #[test]
    fn decodes_panic() {
        let data = Panic { code: U256::from(0x11) }.abi_encode();
        let reason = decode_revert_reason(&data).unwrap();
        assert!(!reason.is_empty());
    }

    #[test]
    fn ignores_unrecognized_payloads() {
        assert_eq!(decode_revert_reason(&[]), None);
        assert_eq!(decode_revert_reason(&[0xde, 0xad, 0xbe, 0xef]), None);
    }
}
