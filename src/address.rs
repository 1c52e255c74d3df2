//! Checksummed address derivation and native-address conversion
//!
//! The Gateway's wire contract speaks checksummed hex addresses, while chain
//! tooling hands out SS58-encoded 32-byte account ids. Ethereum-mapped
//! accounts embed their 20-byte EVM address at the head of the account id,
//! so both encodings normalize to the same mixed-case hex form here.

use sha3::{Digest, Keccak256};

use crate::error::{Result, SiwfError};

// SS58 payload layout: prefix (1-2 bytes) + 32-byte account id + 2-byte checksum
const SS58_ACCOUNT_LEN: usize = 32;
const SS58_CHECKSUM_LEN: usize = 2;
const EVM_ADDRESS_LEN: usize = 20;

/// Lowercase an address and drop an optional `0x` prefix. No validation.
pub fn strip_address(address: &str) -> String {
    let lower = address.to_lowercase();
    match lower.strip_prefix("0x") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

fn is_plain_address(stripped: &str) -> bool {
    stripped.len() == EVM_ADDRESS_LEN * 2 && stripped.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Apply the mixed-case checksum rule to a hex address.
///
/// Character `i` of the stripped lowercase address is uppercased iff nibble
/// `i` of the Keccak-256 hash of that address is 8 or more. With `chain_id`
/// the hash input is salted as `{chain_id}0x{address}` (the EIP-1191 rule);
/// without it this is plain EIP-55. Accepts input with or without a `0x`
/// prefix, in any casing.
pub fn to_checksum_address(address: &str, chain_id: Option<&str>) -> Result<String> {
    let stripped = strip_address(address);
    if !is_plain_address(&stripped) {
        return Err(SiwfError::InvalidAddressFormat(address.to_string()));
    }

    let hash = match chain_id {
        Some(id) => Keccak256::digest(format!("{id}0x{stripped}").as_bytes()),
        None => Keccak256::digest(stripped.as_bytes()),
    };

    let mut out = String::with_capacity(2 + stripped.len());
    out.push_str("0x");
    for (i, c) in stripped.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Convert a chain-native SS58 account id to its checksummed EVM address.
///
/// The base58 payload ends with a 2-byte checksum preceded by the 32-byte
/// account id (the prefix in front is one or two bytes depending on the
/// network id); the EVM address is the first 20 bytes of the account id.
pub fn convert_ss58_address_to_ethereum(native: &str, chain_id: Option<&str>) -> Result<String> {
    let decoded = bs58::decode(native)
        .into_vec()
        .map_err(|_| SiwfError::InvalidAddressFormat(native.to_string()))?;
    if decoded.len() <= SS58_ACCOUNT_LEN + SS58_CHECKSUM_LEN {
        return Err(SiwfError::InvalidAddressFormat(native.to_string()));
    }
    let account_start = decoded.len() - SS58_ACCOUNT_LEN - SS58_CHECKSUM_LEN;
    let evm = &decoded[account_start..account_start + EVM_ADDRESS_LEN];
    to_checksum_address(&hex::encode(evm), chain_id)
}

/// Normalize a Gateway control key to checksummed form, whichever encoding
/// the Gateway used for it.
pub fn normalize_account_address(address: &str, chain_id: Option<&str>) -> Result<String> {
    if address.starts_with("0x") || address.starts_with("0X") {
        to_checksum_address(address, chain_id)
    } else {
        convert_ss58_address_to_ethereum(address, chain_id)
    }
}
