//! Sign-up flow: assemble and sign the account-creation payload set,
//! submit it, and watch for the account to materialize
//!
//! The payload set is fixed: a sponsored-account delegation and a handle
//! claim always; a graph-key registration and a recovery commitment only
//! when the signed request asks for the matching credential. Generated key
//! material and credential documents ride back on the return value since
//! the Gateway never echoes them.

use std::sync::Arc;

use tracing::{debug, error};

use crate::address::normalize_account_address;
use crate::config::SiwfConfig;
use crate::crypto::{
    build_graph_key_credential, build_recovery_secret_credential, generate_graph_key_pair,
};
use crate::error::{Result, SiwfError};
use crate::gateway;
use crate::payloads::{
    build_add_provider, build_claim_handle, build_item_actions, build_recovery_commitment,
    AddProviderExtrinsic, GRAPH_KEY_SCHEMA_ID, GRAPH_KEY_TARGET_HASH, PAYLOAD_EXPIRATION_DELTA,
};
use crate::recovery::{ContactType, RecoverySecretProvider};
use crate::signing::SignatureProvider;
use crate::transport::GatewayTransport;
use crate::types::{
    AccountResponse, AddProviderPayload, ChainInfoResponse, ClaimHandlePayload,
    GatewaySiwfResponse, GraphKeySubject, ItemAction, ItemActionsPayload,
    RecoveryCommitmentPayload, SiwfCredential, SiwfPayload, SiwfPublicKey, SiwfResponse,
    SiwfSignedRequest, VERIFIED_GRAPH_KEY_CREDENTIAL, VERIFIED_RECOVERY_SECRET_CREDENTIAL,
};

/// Callback invoked once a freshly created account materializes on chain.
pub type MsaCreationCallback = Arc<dyn Fn(AccountResponse) + Send + Sync>;

/// The sign-up assembly output: the signed payload set plus the locally
/// generated material the Gateway will never echo back.
#[derive(Debug)]
pub struct SignUpArtifacts {
    pub payloads: Vec<SiwfPayload>,
    pub raw_credentials: Vec<SiwfCredential>,
    pub graph_key: Option<GraphKeySubject>,
    pub recovery_secret: Option<String>,
}

fn expiration_for(chain_info: &ChainInfoResponse) -> Result<u32> {
    let lapse = chain_info
        .finalized_blocknumber
        .saturating_add(u64::from(PAYLOAD_EXPIRATION_DELTA));
    u32::try_from(lapse).map_err(|_| {
        SiwfError::InvalidGatewayResponse(format!(
            "finalized block number {} out of expiration range",
            chain_info.finalized_blocknumber
        ))
    })
}

fn provider_msa_id(provider_account: &AccountResponse) -> Result<u64> {
    provider_account.msa_id.parse().map_err(|_| {
        SiwfError::InvalidGatewayResponse(format!(
            "provider msaId {:?} is not numeric",
            provider_account.msa_id
        ))
    })
}

/// Build and sign the sign-up payload set.
///
/// Fails before any signature is requested when the provider's msaId does
/// not parse or the expiration cannot be computed.
#[allow(clippy::too_many_arguments)]
pub async fn create_sign_up_payloads(
    signer: &dyn SignatureProvider,
    recovery: &dyn RecoverySecretProvider,
    account_id: &str,
    signed_request: &SiwfSignedRequest,
    provider_account: &AccountResponse,
    chain_info: &ChainInfoResponse,
    sign_up_handle: &str,
    sign_up_email: Option<&str>,
) -> Result<SignUpArtifacts> {
    let expiration = expiration_for(chain_info)?;
    let authorized_msa_id = provider_msa_id(provider_account)?;

    let mut payloads = Vec::new();
    let mut raw_credentials = Vec::new();
    let mut graph_key = None;
    let mut recovery_secret = None;

    payloads.push(
        build_add_provider(
            signer,
            account_id,
            AddProviderPayload {
                authorized_msa_id,
                schema_ids: signed_request.permissions().to_vec(),
                expiration,
            },
            AddProviderExtrinsic::CreateSponsoredAccountWithDelegation,
        )
        .await?,
    );

    payloads.push(
        build_claim_handle(
            signer,
            account_id,
            ClaimHandlePayload {
                base_handle: sign_up_handle.to_string(),
                expiration,
            },
        )
        .await?,
    );

    if signed_request.contains_credential_type(VERIFIED_GRAPH_KEY_CREDENTIAL) {
        let pair = generate_graph_key_pair();
        payloads.push(
            build_item_actions(
                signer,
                account_id,
                ItemActionsPayload {
                    schema_id: GRAPH_KEY_SCHEMA_ID,
                    target_hash: GRAPH_KEY_TARGET_HASH,
                    expiration,
                    actions: vec![ItemAction::AddItem {
                        payload_hex: pair.public_key_hex.clone(),
                    }],
                },
            )
            .await?,
        );
        let credential = build_graph_key_credential(account_id, &pair);
        graph_key = Some(credential.credential_subject.clone());
        raw_credentials.push(SiwfCredential::GraphKey(credential));
    }

    let email = sign_up_email.unwrap_or_default();
    if !email.is_empty()
        && signed_request.contains_credential_type(VERIFIED_RECOVERY_SECRET_CREDENTIAL)
    {
        let secret = recovery.generate();
        let commitment = recovery.commitment(&secret, ContactType::Email, email)?;
        payloads.push(
            build_recovery_commitment(
                signer,
                account_id,
                RecoveryCommitmentPayload {
                    recovery_commitment_hex: commitment,
                    expiration,
                },
            )
            .await?,
        );
        let credential = build_recovery_secret_credential(account_id, &secret);
        raw_credentials.push(SiwfCredential::RecoverySecret(credential));
        recovery_secret = Some(secret);
    } else {
        debug!("Recovery data not provided; skipping recovery commitment");
    }

    Ok(SignUpArtifacts {
        payloads,
        raw_credentials,
        graph_key,
        recovery_secret,
    })
}

fn spawn_materialization_poll(
    transport: Arc<dyn GatewayTransport>,
    account_id: String,
    callback: MsaCreationCallback,
    config: &SiwfConfig,
) {
    let interval = config.poll_interval;
    let timeout = config.poll_timeout;
    tokio::spawn(async move {
        match gateway::poll_for_account(transport.as_ref(), &account_id, interval, timeout).await {
            Ok(account) => callback(account),
            Err(e) => {
                error!(account = %account_id, error = %e, "Account materialization poll failed")
            }
        }
    });
}

/// Execute the sign-up flow end to end.
///
/// The aggregated submission carries the generated credential documents.
/// When a materialization callback is supplied, a detached poll keeps
/// probing the account after this function returns; the returned
/// acknowledgment reflects submission success only.
#[allow(clippy::too_many_arguments)]
pub async fn process_sign_up(
    signer: &dyn SignatureProvider,
    transport: Arc<dyn GatewayTransport>,
    recovery: &dyn RecoverySecretProvider,
    signed_request: &SiwfSignedRequest,
    account_id: &str,
    provider_account: &AccountResponse,
    chain_info: &ChainInfoResponse,
    sign_up_handle: &str,
    sign_up_email: Option<&str>,
    msa_callback: Option<MsaCreationCallback>,
    config: &SiwfConfig,
) -> Result<GatewaySiwfResponse> {
    let artifacts = create_sign_up_payloads(
        signer,
        recovery,
        account_id,
        signed_request,
        provider_account,
        chain_info,
        sign_up_handle,
        sign_up_email,
    )
    .await?;

    let serialized_credentials: Vec<serde_json::Value> = artifacts
        .raw_credentials
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<_, _>>()?;

    let siwf_response = SiwfResponse {
        user_public_key: SiwfPublicKey::from_account_id(account_id),
        payloads: artifacts.payloads,
        credentials: artifacts.raw_credentials,
    };
    let mut response = gateway::post_siwf(transport.as_ref(), &siwf_response).await?;

    response.control_key =
        normalize_account_address(&response.control_key, config.checksum_chain_id.as_deref())?;
    response.graph_key = artifacts.graph_key;
    response.recovery_secret = artifacts.recovery_secret;
    response.raw_credentials = Some(serialized_credentials);

    if let Some(callback) = msa_callback {
        spawn_materialization_poll(transport, account_id.to_string(), callback, config);
    }

    Ok(response)
}
