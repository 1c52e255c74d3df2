//! Signing seam: structured requests handed to the injected signer
//!
//! Two request shapes exist. Message signing carries a human-readable
//! CAIP-122 string; typed-data signing carries an EIP-712 document. Both
//! serialize to the wallet RPC wire shape
//! `{ "method": ..., "params": [account, data] }` so a browser provider can
//! relay them unchanged.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;

/// Chain id of the Frequency EVM signing domain
pub const EIP712_CHAIN_ID: &str = "0x190f1b44";

/// Fixed verifying contract of the Frequency signing domain
pub const EIP712_VERIFYING_CONTRACT: &str = "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC";

/// EIP-712 domain all payload signatures bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    pub chain_id: String,
    pub name: String,
    pub verifying_contract: String,
    pub version: String,
}

impl Eip712Domain {
    /// The fixed Frequency signing domain.
    pub fn frequency() -> Self {
        Self {
            chain_id: EIP712_CHAIN_ID.to_string(),
            name: "Frequency".to_string(),
            verifying_contract: EIP712_VERIFYING_CONTRACT.to_string(),
            version: "1".to_string(),
        }
    }
}

/// One field of an EIP-712 type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl Eip712Field {
    pub fn new(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
        }
    }
}

fn eip712_domain_fields() -> Vec<Eip712Field> {
    vec![
        Eip712Field::new("name", "string"),
        Eip712Field::new("version", "string"),
        Eip712Field::new("chainId", "uint256"),
        Eip712Field::new("verifyingContract", "address"),
    ]
}

/// A complete EIP-712 signing document as handed to
/// `eth_signTypedData_v4`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Document {
    pub types: BTreeMap<String, Vec<Eip712Field>>,
    pub primary_type: String,
    pub domain: Eip712Domain,
    pub message: serde_json::Value,
}

impl Eip712Document {
    /// Assemble a document over the Frequency domain. The domain's own type
    /// definition is always included.
    pub fn new(primary_type: &str, fields: Vec<Eip712Field>, message: serde_json::Value) -> Self {
        let mut types = BTreeMap::new();
        types.insert("EIP712Domain".to_string(), eip712_domain_fields());
        types.insert(primary_type.to_string(), fields);
        Self {
            types,
            primary_type: primary_type.to_string(),
            domain: Eip712Domain::frequency(),
            message,
        }
    }

    /// Add a nested struct type referenced from the primary type.
    pub fn with_type(mut self, name: &str, fields: Vec<Eip712Field>) -> Self {
        self.types.insert(name.to_string(), fields);
        self
    }
}

/// A structured request handed to the injected signer.
#[derive(Debug, Clone)]
pub enum SignatureRequest {
    /// CAIP-122 style human-readable message signature
    PersonalSign {
        account_id: String,
        message: String,
    },
    /// EIP-712 typed-data signature
    SignTypedData {
        account_id: String,
        typed_data: Eip712Document,
    },
}

impl SignatureRequest {
    /// The wallet RPC method name for this request shape.
    pub fn method(&self) -> &'static str {
        match self {
            SignatureRequest::PersonalSign { .. } => "personal_sign",
            SignatureRequest::SignTypedData { .. } => "eth_signTypedData_v4",
        }
    }

    /// The account the signature is requested from.
    pub fn account_id(&self) -> &str {
        match self {
            SignatureRequest::PersonalSign { account_id, .. } => account_id,
            SignatureRequest::SignTypedData { account_id, .. } => account_id,
        }
    }
}

impl Serialize for SignatureRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("method", self.method())?;
        match self {
            SignatureRequest::PersonalSign {
                account_id,
                message,
            } => map.serialize_entry("params", &(account_id, message))?,
            SignatureRequest::SignTypedData {
                account_id,
                typed_data,
            } => map.serialize_entry("params", &(account_id, typed_data))?,
        }
        map.end()
    }
}

/// Externally supplied signing capability (wallet bridge or key
/// management). A rejection is fatal for the payload being built; the SDK
/// never retries a signature.
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Produce a signature for the request, returned as a hex string.
    async fn sign(&self, request: SignatureRequest) -> Result<String>;
}
