//! Login flow for accounts that already exist
//!
//! A login produces a single signed attestation message scoped to the
//! provider's callback URI, submits it, and returns the Gateway's
//! acknowledgment unchanged. Nothing is written on chain.

use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::address::normalize_account_address;
use crate::config::SiwfConfig;
use crate::crypto::issued_now;
use crate::error::{Result, SiwfError};
use crate::gateway;
use crate::payloads::{build_login, LoginMessageParams};
use crate::signing::SignatureProvider;
use crate::transport::GatewayTransport;
use crate::types::{
    ChainInfoResponse, GatewaySiwfResponse, SiwfPublicKey, SiwfResponse, SiwfSignedRequest,
};

const LOGIN_MESSAGE_VERSION: &str = "1";

/// Sign a login attestation for `user_address` and submit it.
///
/// The attestation domain is the host of the request's callback URI and the
/// chain id is the genesis hash, so a signature replayed against another
/// site or chain does not verify. The returned control key is normalized to
/// its checksummed form whatever encoding the Gateway answered with.
pub async fn process_login(
    signer: &dyn SignatureProvider,
    transport: &dyn GatewayTransport,
    signed_request: &SiwfSignedRequest,
    user_address: &str,
    chain_info: &ChainInfoResponse,
    config: &SiwfConfig,
) -> Result<GatewaySiwfResponse> {
    let callback = signed_request.callback();
    let parsed = Url::parse(callback)
        .map_err(|e| SiwfError::RequestDecodeError(format!("invalid callback URI {callback}: {e}")))?;
    let domain = parsed
        .host_str()
        .ok_or_else(|| {
            SiwfError::RequestDecodeError(format!("callback URI {callback} has no host"))
        })?
        .to_string();

    let params = LoginMessageParams {
        domain,
        uri: callback.to_string(),
        version: LOGIN_MESSAGE_VERSION.to_string(),
        nonce: Uuid::new_v4().to_string(),
        chain_id: chain_info.genesis.clone(),
        issued_at: issued_now(),
    };
    debug!(domain = %params.domain, account = %user_address, "Signing login attestation");
    let login_payload = build_login(signer, user_address, &params).await?;

    let siwf_response = SiwfResponse {
        user_public_key: SiwfPublicKey::from_account_id(user_address),
        payloads: vec![login_payload],
        credentials: vec![],
    };
    let mut response = gateway::post_siwf(transport, &siwf_response).await?;
    response.control_key =
        normalize_account_address(&response.control_key, config.checksum_chain_id.as_deref())?;
    Ok(response)
}
