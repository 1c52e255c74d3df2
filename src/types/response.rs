//! Gateway account, chain, and submission response types

use serde::{Deserialize, Serialize};

use crate::types::credential::{GraphKeySubject, SiwfCredential};
use crate::types::payload::SiwfPayload;
use crate::types::request::SiwfPublicKey;

/// Account record as the Gateway returns it. Existence of this record is
/// the protocol's definition of "account exists".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub msa_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<HandleResponse>,
}

/// Claimed-handle breakdown attached to an account. The Gateway serializes
/// these fields in snake_case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleResponse {
    pub base_handle: String,
    pub canonical_base: String,
    pub suffix: u16,
}

/// Chain tip summary from the Gateway, used for payload expirations and the
/// login nonce domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfoResponse {
    pub blocknumber: u64,
    pub finalized_blocknumber: u64,
    pub genesis: String,
    pub runtime_version: u32,
}

/// The aggregated unit submitted to the Gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwfResponse {
    pub user_public_key: SiwfPublicKey,
    pub payloads: Vec<SiwfPayload>,
    #[serde(default)]
    pub credentials: Vec<SiwfCredential>,
}

/// Gateway acknowledgment of a submitted SIWF response.
///
/// `graph_key`, `raw_credentials`, and `recovery_secret` are attached
/// locally after submission; the Gateway never echoes generated material
/// back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySiwfResponse {
    pub control_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msa_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_up_reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_up_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_key: Option<GraphKeySubject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_credentials: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_secret: Option<String>,
}
