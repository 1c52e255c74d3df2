//! Recovery secret generation and commitment derivation
//!
//! The secret never leaves the client except inside the recovery-secret
//! credential; only the derived commitment is registered on chain.

use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Keccak256};

use crate::error::{Result, SiwfError};

/// Contact channel a recovery commitment binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactType {
    Email,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Email => "email",
        }
    }
}

/// Source of recovery secrets and their on-chain commitments.
///
/// The default implementation is [`StandardRecoverySecret`]; tests and
/// hosts with their own entropy policy can substitute one.
pub trait RecoverySecretProvider: Send + Sync {
    /// A fresh secret, formatted for display to the user.
    fn generate(&self) -> String;

    /// The commitment binding `secret` to a verified contact.
    fn commitment(
        &self,
        secret: &str,
        contact_type: ContactType,
        contact_value: &str,
    ) -> Result<String>;
}

/// Default provider: 32 bytes of OS entropy rendered as sixteen
/// dash-separated groups of four uppercase hex digits.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRecoverySecret;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

impl RecoverySecretProvider for StandardRecoverySecret {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let digits = hex::encode_upper(bytes);
        digits
            .as_bytes()
            .chunks(4)
            .map(|group| std::str::from_utf8(group).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("-")
    }

    fn commitment(
        &self,
        secret: &str,
        contact_type: ContactType,
        contact_value: &str,
    ) -> Result<String> {
        let stripped: String = secret.chars().filter(|c| *c != '-').collect();
        let secret_bytes =
            hex::decode(&stripped).map_err(|_| SiwfError::MalformedHexPayload(secret.to_string()))?;
        if secret_bytes.len() != 32 {
            return Err(SiwfError::MalformedHexPayload(secret.to_string()));
        }

        let secret_hash = keccak256(&secret_bytes);
        let contact_hash =
            keccak256(format!("{}{}", contact_type.as_str(), contact_value).as_bytes());
        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(&secret_hash);
        preimage[32..].copy_from_slice(&contact_hash);
        Ok(format!("0x{}", hex::encode(keccak256(&preimage))))
    }
}
