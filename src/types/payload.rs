//! Signed payload types submitted to the Gateway
//!
//! Every payload pairs a signature envelope with a type-tagged body; all but
//! the login attestation also name the on-chain dispatch target the Gateway
//! should submit them to.

use serde::{Deserialize, Serialize};

/// Signature envelope attached to every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEnvelope {
    pub algo: String,
    pub encoding: String,
    pub encoded_value: String,
}

impl SignatureEnvelope {
    /// Envelope for a secp256k1 signature hex string.
    pub fn secp256k1(signature: impl Into<String>) -> Self {
        Self {
            algo: "SECP256K1".to_string(),
            encoding: "base16".to_string(),
            encoded_value: signature.into(),
        }
    }
}

/// On-chain dispatch target for a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadEndpoint {
    pub pallet: String,
    pub extrinsic: String,
}

impl PayloadEndpoint {
    pub fn new(pallet: &str, extrinsic: &str) -> Self {
        Self {
            pallet: pallet.to_string(),
            extrinsic: extrinsic.to_string(),
        }
    }
}

/// A signed payload of the aggregated SIWF response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiwfPayload {
    pub signature: SignatureEnvelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<PayloadEndpoint>,
    #[serde(flatten)]
    pub body: PayloadBody,
}

impl SiwfPayload {
    /// The wire type tag of this payload.
    pub fn type_tag(&self) -> &'static str {
        match &self.body {
            PayloadBody::Login(_) => "login",
            PayloadBody::AddProvider(_) => "addProvider",
            PayloadBody::ClaimHandle(_) => "claimHandle",
            PayloadBody::ItemActions(_) => "itemActions",
            PayloadBody::RecoveryCommitment(_) => "recoveryCommitment",
        }
    }
}

/// Closed union over the protocol's payload type tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum PayloadBody {
    Login(LoginPayload),
    AddProvider(AddProviderPayload),
    ClaimHandle(ClaimHandlePayload),
    ItemActions(ItemActionsPayload),
    RecoveryCommitment(RecoveryCommitmentPayload),
}

/// Login attestation body: the exact signed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub message: String,
}

/// Delegation grant body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProviderPayload {
    pub authorized_msa_id: u64,
    pub schema_ids: Vec<u16>,
    pub expiration: u32,
}

/// Handle claim body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimHandlePayload {
    pub base_handle: String,
    pub expiration: u32,
}

/// Stateful-storage item actions body (graph key registration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemActionsPayload {
    pub schema_id: u16,
    pub target_hash: u32,
    pub expiration: u32,
    pub actions: Vec<ItemAction>,
}

/// One stateful-storage item action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemAction {
    AddItem {
        #[serde(rename = "payloadHex")]
        payload_hex: String,
    },
}

/// Recovery-commitment registration body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryCommitmentPayload {
    pub recovery_commitment_hex: String,
    pub expiration: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_payload_serializes_without_endpoint() {
        let payload = SiwfPayload {
            signature: SignatureEnvelope::secp256k1("0xabc"),
            endpoint: None,
            body: PayloadBody::Login(LoginPayload {
                message: "hello".to_string(),
            }),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "signature": {
                    "algo": "SECP256K1",
                    "encoding": "base16",
                    "encodedValue": "0xabc"
                },
                "type": "login",
                "payload": { "message": "hello" }
            })
        );
    }

    #[test]
    fn test_add_provider_serializes_with_endpoint() {
        let payload = SiwfPayload {
            signature: SignatureEnvelope::secp256k1("0xsig"),
            endpoint: Some(PayloadEndpoint::new(
                "msa",
                "createSponsoredAccountWithDelegation",
            )),
            body: PayloadBody::AddProvider(AddProviderPayload {
                authorized_msa_id: 1,
                schema_ids: vec![8, 9, 10],
                expiration: 100,
            }),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "addProvider");
        assert_eq!(value["endpoint"]["pallet"], "msa");
        assert_eq!(value["payload"]["authorizedMsaId"], 1);
        assert_eq!(value["payload"]["schemaIds"], json!([8, 9, 10]));
    }

    #[test]
    fn test_item_action_uses_add_item_tag() {
        let action = ItemAction::AddItem {
            payload_hex: "0x1234".to_string(),
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value, json!({ "type": "addItem", "payloadHex": "0x1234" }));
    }

    #[test]
    fn test_payload_round_trips_through_wire_form() {
        let wire = json!({
            "signature": {
                "algo": "SECP256K1",
                "encoding": "base16",
                "encodedValue": "0xsig"
            },
            "endpoint": { "pallet": "handles", "extrinsic": "claimHandle" },
            "type": "claimHandle",
            "payload": { "baseHandle": "JohnDoe", "expiration": 122 }
        });
        let payload: SiwfPayload = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(payload.type_tag(), "claimHandle");
        match &payload.body {
            PayloadBody::ClaimHandle(body) => {
                assert_eq!(body.base_handle, "JohnDoe");
                assert_eq!(body.expiration, 122);
            }
            other => panic!("wrong variant: {other:?}"),
        }
        assert_eq!(serde_json::to_value(&payload).unwrap(), wire);
    }
}
