//! SIWF orchestration entry point
//!
//! `start_siwf` is the one call a host application makes: decode the
//! provider's signed request, look up both accounts and the chain tip in
//! parallel, then branch into the login or sign-up flow.

use std::sync::Arc;

use tracing::info;

use crate::codec::decode_signed_request;
use crate::config::SiwfConfig;
use crate::error::{Result, SiwfError};
use crate::gateway;
use crate::login::process_login;
use crate::recovery::{RecoverySecretProvider, StandardRecoverySecret};
use crate::signing::SignatureProvider;
use crate::signup::{process_sign_up, MsaCreationCallback};
use crate::transport::GatewayTransport;
use crate::types::{GatewaySiwfResponse, VERIFIED_RECOVERY_SECRET_CREDENTIAL};

/// Per-call options for [`start_siwf`].
///
/// The sign-up fields are only consulted when the account does not exist
/// yet. The email is required exactly when the signed request asks for a
/// recovery-secret credential.
pub struct SiwfOptions {
    /// Handle to claim when the flow turns out to be a sign-up
    pub sign_up_handle: Option<String>,
    /// Contact email backing the recovery commitment
    pub sign_up_email: Option<String>,
    /// Invoked from a detached task once a created account materializes
    pub msa_callback: Option<MsaCreationCallback>,
    /// Recovery-secret generation, swappable for tests
    pub recovery: Arc<dyn RecoverySecretProvider>,
    pub config: SiwfConfig,
}

impl Default for SiwfOptions {
    fn default() -> Self {
        Self {
            sign_up_handle: None,
            sign_up_email: None,
            msa_callback: None,
            recovery: Arc::new(StandardRecoverySecret),
            config: SiwfConfig::default(),
        }
    }
}

/// Run the complete SIWF flow for one account against one Gateway.
///
/// The three Gateway lookups run concurrently and the first failure aborts
/// the flow. An existing account logs in; a missing one signs up. Sign-up
/// inputs are validated before any signature is requested, so a rejected
/// call never leaves a half-signed payload set behind.
pub async fn start_siwf(
    account_id: &str,
    signer: &dyn SignatureProvider,
    transport: Arc<dyn GatewayTransport>,
    encoded_signed_request: &str,
    options: SiwfOptions,
) -> Result<GatewaySiwfResponse> {
    let signed_request = decode_signed_request(encoded_signed_request)?;

    let (user_account, provider_account, chain_info) = tokio::try_join!(
        gateway::get_account(transport.as_ref(), account_id),
        gateway::get_account(transport.as_ref(), signed_request.provider_address()),
        gateway::get_chain_info(transport.as_ref()),
    )?;

    let provider_account = provider_account.ok_or(SiwfError::ProviderAccountNotFound)?;

    match user_account {
        Some(_) => {
            info!(account = %account_id, "Account exists; processing as login");
            process_login(
                signer,
                transport.as_ref(),
                &signed_request,
                account_id,
                &chain_info,
                &options.config,
            )
            .await
        }
        None => {
            info!(account = %account_id, "No account found; processing as sign-up");
            let handle = options.sign_up_handle.as_deref().unwrap_or_default();
            if handle.is_empty() {
                return Err(SiwfError::MissingSignUpField("signUpHandle"));
            }
            let email = options.sign_up_email.as_deref().unwrap_or_default();
            if email.is_empty()
                && signed_request.contains_credential_type(VERIFIED_RECOVERY_SECRET_CREDENTIAL)
            {
                return Err(SiwfError::MissingSignUpField("signUpEmail"));
            }
            process_sign_up(
                signer,
                transport,
                options.recovery.as_ref(),
                &signed_request,
                account_id,
                &provider_account,
                &chain_info,
                handle,
                options.sign_up_email.as_deref(),
                options.msa_callback,
                &options.config,
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{string_from_base64_url, string_to_base64_url};
    use crate::signing::SignatureRequest;
    use crate::transport::{GatewayResponse, HttpMethod};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const USER: &str = "0xf24FF3a9CF04c71Dbc94D0b566f7A27B94566cac";
    const PROVIDER: &str = "0x1111111111111111111111111111111111111111";

    struct RecordingSigner {
        calls: AtomicU32,
    }

    impl RecordingSigner {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl SignatureProvider for RecordingSigner {
        async fn sign(&self, _request: SignatureRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("0xorchsig".to_string())
        }
    }

    /// Routes by path: account lookups answer per configured status, the
    /// chain tip and the SIWF submission always succeed.
    struct RoutingTransport {
        user_status: u16,
        provider_status: u16,
        seen_paths: Mutex<Vec<String>>,
        posts: Mutex<Vec<serde_json::Value>>,
    }

    impl RoutingTransport {
        fn new(user_status: u16, provider_status: u16) -> Arc<Self> {
            Arc::new(Self {
                user_status,
                provider_status,
                seen_paths: Mutex::new(Vec::new()),
                posts: Mutex::new(Vec::new()),
            })
        }

        fn submitted_payload_types(&self) -> Vec<String> {
            let posts = self.posts.lock().unwrap();
            let encoded = posts[0]["authorizationPayload"].as_str().unwrap();
            let decoded = string_from_base64_url(encoded).unwrap();
            let submitted: serde_json::Value = serde_json::from_str(&decoded).unwrap();
            submitted["payloads"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["type"].as_str().unwrap().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl GatewayTransport for RoutingTransport {
        async fn fetch(
            &self,
            _method: HttpMethod,
            path: &str,
            body: Option<serde_json::Value>,
        ) -> Result<GatewayResponse> {
            self.seen_paths.lock().unwrap().push(path.to_string());
            if path == format!("/v1/accounts/account/{USER}") {
                if self.user_status == 404 {
                    return Ok(GatewayResponse::new(404, Vec::new()));
                }
                return Ok(GatewayResponse::new(200, br#"{"msaId": "7"}"#.to_vec()));
            }
            if path == format!("/v1/accounts/account/{PROVIDER}") {
                if self.provider_status == 404 {
                    return Ok(GatewayResponse::new(404, Vec::new()));
                }
                return Ok(GatewayResponse::new(200, br#"{"msaId": "42"}"#.to_vec()));
            }
            if path == "/v1/frequency/blockinfo" {
                return Ok(GatewayResponse::new(
                    200,
                    br#"{"blocknumber": 105, "finalized_blocknumber": 100, "genesis": "0x4a587bf1", "runtime_version": 2}"#.to_vec(),
                ));
            }
            self.posts.lock().unwrap().push(body.unwrap_or_default());
            Ok(GatewayResponse::new(
                200,
                format!(r#"{{"controlKey": "{USER}", "msaId": "7"}}"#).into_bytes(),
            ))
        }
    }

    fn encoded_request(credentials: serde_json::Value) -> String {
        let request = serde_json::json!({
            "requestedSignatures": {
                "publicKey": {
                    "encodedValue": PROVIDER,
                    "encoding": "base16",
                    "format": "eip-55",
                    "type": "Secp256k1"
                },
                "signature": {
                    "algo": "SECP256K1",
                    "encoding": "base16",
                    "encodedValue": "0xdeadbeef"
                },
                "payload": { "callback": "http://localhost:3000", "permissions": [8, 9] }
            },
            "requestedCredentials": credentials,
        });
        string_to_base64_url(&request.to_string())
    }

    fn recovery_credential_entry() -> serde_json::Value {
        serde_json::json!({
            "type": "VerifiedRecoverySecretCredential",
            "hash": ["bciqpg6qm4rnu2j4v6ghxqqgwkggokwvxs3t2bexbd3obkypkiryylxq"]
        })
    }

    #[tokio::test]
    async fn test_missing_provider_account_aborts_flow() {
        let signer = RecordingSigner::new();
        let transport = RoutingTransport::new(200, 404);

        let err = start_siwf(
            USER,
            &signer,
            transport.clone() as Arc<dyn GatewayTransport>,
            &encoded_request(serde_json::json!([])),
            SiwfOptions::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Unable to find provider account!");
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
        assert!(transport.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_without_handle_is_rejected_before_signing() {
        let signer = RecordingSigner::new();
        let transport = RoutingTransport::new(404, 200);

        let err = start_siwf(
            USER,
            &signer,
            transport.clone() as Arc<dyn GatewayTransport>,
            &encoded_request(serde_json::json!([])),
            SiwfOptions::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "signUpHandle missing for non-existent account."
        );
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
        assert!(transport.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_requires_email_when_recovery_credential_requested() {
        let signer = RecordingSigner::new();
        let transport = RoutingTransport::new(404, 200);
        let options = SiwfOptions {
            sign_up_handle: Some("JohnDoe".to_string()),
            ..SiwfOptions::default()
        };

        let err = start_siwf(
            USER,
            &signer,
            transport as Arc<dyn GatewayTransport>,
            &encoded_request(serde_json::json!([recovery_credential_entry()])),
            options,
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "signUpEmail missing for non-existent account."
        );
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_email_is_optional_without_recovery_credential() {
        let signer = RecordingSigner::new();
        let transport = RoutingTransport::new(404, 200);
        let options = SiwfOptions {
            sign_up_handle: Some("JohnDoe".to_string()),
            ..SiwfOptions::default()
        };

        let response = start_siwf(
            USER,
            &signer,
            transport.clone() as Arc<dyn GatewayTransport>,
            &encoded_request(serde_json::json!([])),
            options,
        )
        .await
        .unwrap();

        assert_eq!(response.control_key, USER);
        assert_eq!(
            transport.submitted_payload_types(),
            ["addProvider", "claimHandle"]
        );
        assert_eq!(signer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_existing_account_logs_in() {
        let signer = RecordingSigner::new();
        let transport = RoutingTransport::new(200, 200);

        let response = start_siwf(
            USER,
            &signer,
            transport.clone() as Arc<dyn GatewayTransport>,
            &encoded_request(serde_json::json!([])),
            SiwfOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.control_key, USER);
        assert_eq!(response.msa_id.as_deref(), Some("7"));
        assert_eq!(transport.submitted_payload_types(), ["login"]);
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_undecodable_request_fails_before_any_gateway_call() {
        let signer = RecordingSigner::new();
        let transport = RoutingTransport::new(200, 200);

        let err = start_siwf(
            USER,
            &signer,
            transport.clone() as Arc<dyn GatewayTransport>,
            "!!definitely not base64url!!",
            SiwfOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SiwfError::RequestDecodeError(_)));
        assert!(transport.seen_paths.lock().unwrap().is_empty());
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }
}
