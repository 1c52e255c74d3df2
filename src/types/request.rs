//! Decoded signed-request types
//!
//! A provider hands the client an opaque base64url blob; decoded, it names
//! the provider's public key, the provider's signature over the request,
//! the callback URI with the requested permission set, and the credential
//! types the provider wants back.

use serde::{Deserialize, Serialize};

use crate::types::payload::SignatureEnvelope;

/// Public key descriptor used in both signed requests and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwfPublicKey {
    pub encoded_value: String,
    pub encoding: String,
    pub format: String,
    #[serde(rename = "type")]
    pub key_type: String,
}

impl SiwfPublicKey {
    /// Descriptor for a checksummed hex account id.
    pub fn from_account_id(account_id: impl Into<String>) -> Self {
        Self {
            encoded_value: account_id.into(),
            encoding: "base16".to_string(),
            format: "eip-55".to_string(),
            key_type: "Secp256k1".to_string(),
        }
    }
}

/// The provider's decoded signed authorization request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwfSignedRequest {
    pub requested_signatures: RequestedSignatures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_credentials: Option<Vec<RequestedCredential>>,
}

impl SiwfSignedRequest {
    /// Whether the request asks for a credential type, directly or inside
    /// an any-of group. An empty target matches nothing.
    pub fn contains_credential_type(&self, target: &str) -> bool {
        if target.is_empty() {
            return false;
        }
        let Some(requested) = &self.requested_credentials else {
            return false;
        };
        requested.iter().any(|entry| match entry {
            RequestedCredential::AnyOf { any_of } => {
                any_of.iter().any(|c| c.credential_type == target)
            }
            RequestedCredential::Single(c) => c.credential_type == target,
        })
    }

    /// The provider's address exactly as encoded in the request. Gateway
    /// lookups use it verbatim.
    pub fn provider_address(&self) -> &str {
        &self.requested_signatures.public_key.encoded_value
    }

    /// Callback URI the login attestation is scoped to.
    pub fn callback(&self) -> &str {
        &self.requested_signatures.payload.callback
    }

    /// Schema ids the provider requests delegation for.
    pub fn permissions(&self) -> &[u16] {
        &self.requested_signatures.payload.permissions
    }
}

/// The request's signature block: who is asking, with proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedSignatures {
    pub public_key: SiwfPublicKey,
    pub signature: SignatureEnvelope,
    pub payload: RequestedSignaturePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedSignaturePayload {
    pub callback: String,
    pub permissions: Vec<u16>,
}

/// One entry of the requested-credential list: a single required type or
/// an any-of group of alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestedCredential {
    AnyOf {
        #[serde(rename = "anyOf")]
        any_of: Vec<CredentialRequest>,
    },
    Single(CredentialRequest),
}

/// A single credential constraint with its acceptable schema hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRequest {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub hash: Vec<String>,
}
