//! Payload builders: render, sign once, wrap
//!
//! Each builder renders its variant's unsigned structure, drives the
//! injected signer exactly once, and wraps the returned signature into the
//! payload envelope. The typed-data documents here match the on-chain
//! signature definitions byte for byte; nothing about them is negotiable
//! per call.

use serde_json::json;

use crate::error::{Result, SiwfError};
use crate::signing::{Eip712Document, Eip712Field, SignatureProvider, SignatureRequest};
use crate::types::{
    AddProviderPayload, ClaimHandlePayload, ItemAction, ItemActionsPayload, LoginPayload,
    PayloadBody, PayloadEndpoint, RecoveryCommitmentPayload, SignatureEnvelope, SiwfPayload,
};

/// Blocks past the finalized tip before sign-up payloads lapse
pub const PAYLOAD_EXPIRATION_DELTA: u32 = 90;

/// Stateful-storage schema id of the graph key item
pub const GRAPH_KEY_SCHEMA_ID: u16 = 7;

/// Target hash for a fresh graph key page
pub const GRAPH_KEY_TARGET_HASH: u32 = 0;

/// Extrinsic an AddProvider delegation dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddProviderExtrinsic {
    /// Create the account and delegate in one call (sign-up)
    CreateSponsoredAccountWithDelegation,
    /// Delegate from an account that already exists
    GrantDelegation,
}

impl AddProviderExtrinsic {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddProviderExtrinsic::CreateSponsoredAccountWithDelegation => {
                "createSponsoredAccountWithDelegation"
            }
            AddProviderExtrinsic::GrantDelegation => "grantDelegation",
        }
    }
}

// Matches /^0[xX][0-9a-fA-F]*$/ with an even total length
fn is_hex_string(value: &str) -> bool {
    let digits = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => digits,
        None => return false,
    };
    value.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

async fn sign_typed_data(
    signer: &dyn SignatureProvider,
    account_id: &str,
    typed_data: Eip712Document,
) -> Result<SignatureEnvelope> {
    let encoded_value = signer
        .sign(SignatureRequest::SignTypedData {
            account_id: account_id.to_string(),
            typed_data,
        })
        .await?;
    Ok(SignatureEnvelope::secp256k1(encoded_value))
}

/// EIP-712 document for a delegation grant. The message renders the
/// authorized MSA id as a decimal string.
pub fn add_provider_typed_data(payload: &AddProviderPayload) -> Eip712Document {
    Eip712Document::new(
        "AddProvider",
        vec![
            Eip712Field::new("authorizedMsaId", "uint64"),
            Eip712Field::new("schemaIds", "uint16[]"),
            Eip712Field::new("expiration", "uint32"),
        ],
        json!({
            "authorizedMsaId": payload.authorized_msa_id.to_string(),
            "schemaIds": payload.schema_ids,
            "expiration": payload.expiration,
        }),
    )
}

/// EIP-712 document for a handle claim.
pub fn claim_handle_typed_data(payload: &ClaimHandlePayload) -> Eip712Document {
    Eip712Document::new(
        "ClaimHandlePayload",
        vec![
            Eip712Field::new("handle", "string"),
            Eip712Field::new("expiration", "uint32"),
        ],
        json!({
            "handle": payload.base_handle,
            "expiration": payload.expiration,
        }),
    )
}

/// EIP-712 document for stateful-storage item actions.
///
/// Every action's payload must be a well-formed hex string; a malformed
/// one fails here, before any signature is requested.
pub fn item_actions_typed_data(payload: &ItemActionsPayload) -> Result<Eip712Document> {
    let mut actions = Vec::with_capacity(payload.actions.len());
    for action in &payload.actions {
        let ItemAction::AddItem { payload_hex } = action;
        if !is_hex_string(payload_hex) {
            return Err(SiwfError::MalformedHexPayload(payload_hex.clone()));
        }
        actions.push(json!({
            "actionType": "Add",
            "data": payload_hex,
            "index": 0,
        }));
    }

    Ok(Eip712Document::new(
        "ItemizedSignaturePayloadV2",
        vec![
            Eip712Field::new("schemaId", "uint16"),
            Eip712Field::new("targetHash", "uint32"),
            Eip712Field::new("expiration", "uint32"),
            Eip712Field::new("actions", "ItemAction[]"),
        ],
        json!({
            "schemaId": payload.schema_id,
            "targetHash": payload.target_hash,
            "expiration": payload.expiration,
            "actions": actions,
        }),
    )
    .with_type(
        "ItemAction",
        vec![
            Eip712Field::new("actionType", "string"),
            Eip712Field::new("data", "bytes"),
            Eip712Field::new("index", "uint16"),
        ],
    ))
}

/// EIP-712 document for a recovery commitment registration.
pub fn recovery_commitment_typed_data(payload: &RecoveryCommitmentPayload) -> Eip712Document {
    Eip712Document::new(
        "AddRecoveryCommitmentPayload",
        vec![
            Eip712Field::new("recoveryCommitment", "bytes32"),
            Eip712Field::new("expiration", "uint32"),
        ],
        json!({
            "recoveryCommitment": payload.recovery_commitment_hex,
            "expiration": payload.expiration,
        }),
    )
}

/// Sign a delegation grant for the provider.
pub async fn build_add_provider(
    signer: &dyn SignatureProvider,
    account_id: &str,
    payload: AddProviderPayload,
    extrinsic: AddProviderExtrinsic,
) -> Result<SiwfPayload> {
    let signature = sign_typed_data(signer, account_id, add_provider_typed_data(&payload)).await?;
    Ok(SiwfPayload {
        signature,
        endpoint: Some(PayloadEndpoint::new("msa", extrinsic.as_str())),
        body: PayloadBody::AddProvider(payload),
    })
}

/// Sign a handle claim.
pub async fn build_claim_handle(
    signer: &dyn SignatureProvider,
    account_id: &str,
    payload: ClaimHandlePayload,
) -> Result<SiwfPayload> {
    let signature = sign_typed_data(signer, account_id, claim_handle_typed_data(&payload)).await?;
    Ok(SiwfPayload {
        signature,
        endpoint: Some(PayloadEndpoint::new("handles", "claimHandle")),
        body: PayloadBody::ClaimHandle(payload),
    })
}

/// Sign a stateful-storage item actions payload (graph key registration).
pub async fn build_item_actions(
    signer: &dyn SignatureProvider,
    account_id: &str,
    payload: ItemActionsPayload,
) -> Result<SiwfPayload> {
    let typed_data = item_actions_typed_data(&payload)?;
    let signature = sign_typed_data(signer, account_id, typed_data).await?;
    Ok(SiwfPayload {
        signature,
        endpoint: Some(PayloadEndpoint::new(
            "statefulStorage",
            "applyItemActionsWithSignatureV2",
        )),
        body: PayloadBody::ItemActions(payload),
    })
}

/// Sign a recovery commitment registration.
pub async fn build_recovery_commitment(
    signer: &dyn SignatureProvider,
    account_id: &str,
    payload: RecoveryCommitmentPayload,
) -> Result<SiwfPayload> {
    let signature =
        sign_typed_data(signer, account_id, recovery_commitment_typed_data(&payload)).await?;
    Ok(SiwfPayload {
        signature,
        endpoint: Some(PayloadEndpoint::new("msa", "addRecoveryCommitment")),
        body: PayloadBody::RecoveryCommitment(payload),
    })
}

/// Arguments of the rendered login message.
#[derive(Debug, Clone)]
pub struct LoginMessageParams {
    pub domain: String,
    pub uri: String,
    pub version: String,
    pub nonce: String,
    pub chain_id: String,
    pub issued_at: String,
}

/// Render the fixed-format CAIP-122 login message.
///
/// The four-space indentation, the indented blank line, and the trailing
/// newline plus two spaces are part of the signed bytes.
pub fn build_login_message(user_address: &str, params: &LoginMessageParams) -> String {
    format!(
        "{domain} wants you to sign in with your Frequency account:\n    frequency:{chain_id}:{user_address}\n    \n    URI: {uri}\n    Version: {version}\n    Nonce: {nonce}\n    Chain ID: frequency:{chain_id}\n    Issued At: {issued_at}\n  ",
        domain = params.domain,
        chain_id = params.chain_id,
        user_address = user_address,
        uri = params.uri,
        version = params.version,
        nonce = params.nonce,
        issued_at = params.issued_at,
    )
}

/// Render and sign the login attestation. Login payloads carry no on-chain
/// endpoint.
pub async fn build_login(
    signer: &dyn SignatureProvider,
    account_id: &str,
    params: &LoginMessageParams,
) -> Result<SiwfPayload> {
    let message = build_login_message(account_id, params);
    let encoded_value = signer
        .sign(SignatureRequest::PersonalSign {
            account_id: account_id.to_string(),
            message: message.clone(),
        })
        .await?;
    Ok(SiwfPayload {
        signature: SignatureEnvelope::secp256k1(encoded_value),
        endpoint: None,
        body: PayloadBody::Login(LoginPayload { message }),
    })
}
