//! Thin request/response mapping over the Gateway wire contract

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::codec::encode_authorization_payload;
use crate::error::{Result, SiwfError};
use crate::poll::poll;
use crate::transport::{GatewayTransport, HttpMethod};
use crate::types::{AccountResponse, ChainInfoResponse, GatewaySiwfResponse, SiwfResponse};

const ACCOUNT_PATH: &str = "/v1/accounts/account";
const CHAIN_INFO_PATH: &str = "/v1/frequency/blockinfo";
const SIWF_PATH: &str = "/v2/accounts/siwf";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationBody {
    authorization_payload: String,
}

fn failed(status: u16, body: String) -> SiwfError {
    SiwfError::GatewayRequestFailed { status, body }
}

/// Fetch an account by id. A 404 is meaningful absence, not an error.
pub async fn get_account(
    transport: &dyn GatewayTransport,
    account_id: &str,
) -> Result<Option<AccountResponse>> {
    let path = format!("{ACCOUNT_PATH}/{account_id}");
    let response = transport.fetch(HttpMethod::Get, &path, None).await?;
    if response.status == 404 {
        debug!(account = %account_id, "Account not found");
        return Ok(None);
    }
    if !response.is_success() {
        return Err(failed(response.status, response.body_text()));
    }
    Ok(Some(response.json()?))
}

/// Fetch the chain tip summary.
pub async fn get_chain_info(transport: &dyn GatewayTransport) -> Result<ChainInfoResponse> {
    let response = transport.fetch(HttpMethod::Get, CHAIN_INFO_PATH, None).await?;
    if !response.is_success() {
        return Err(failed(response.status, response.body_text()));
    }
    response.json()
}

/// Submit the aggregated SIWF response. The POST body wraps the response's
/// base64url JSON form as the authorization payload.
pub async fn post_siwf(
    transport: &dyn GatewayTransport,
    siwf_response: &SiwfResponse,
) -> Result<GatewaySiwfResponse> {
    let body = AuthorizationBody {
        authorization_payload: encode_authorization_payload(siwf_response)?,
    };
    let response = transport
        .fetch(HttpMethod::Post, SIWF_PATH, Some(serde_json::to_value(&body)?))
        .await?;
    if !response.is_success() {
        return Err(failed(response.status, response.body_text()));
    }
    response.json()
}

/// Poll until the account materializes, treating absence as transient.
pub async fn poll_for_account(
    transport: &dyn GatewayTransport,
    account_id: &str,
    interval: Duration,
    timeout: Duration,
) -> Result<AccountResponse> {
    poll(
        || async {
            match get_account(transport, account_id).await {
                Ok(Some(account)) => Ok(account),
                Ok(None) => Err(format!("account {account_id} not yet created")),
                Err(e) => Err(e.to_string()),
            }
        },
        interval,
        timeout,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::GatewayResponse;
    use crate::types::{PayloadBody, LoginPayload, SignatureEnvelope, SiwfPayload, SiwfPublicKey};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed response and records what it was asked.
    struct FixedTransport {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<(HttpMethod, String, Option<serde_json::Value>)>>,
    }

    impl FixedTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GatewayTransport for FixedTransport {
        async fn fetch(
            &self,
            method: HttpMethod,
            path: &str,
            body: Option<serde_json::Value>,
        ) -> Result<GatewayResponse> {
            self.seen
                .lock()
                .unwrap()
                .push((method, path.to_string(), body));
            Ok(GatewayResponse::new(self.status, self.body.as_bytes().to_vec()))
        }
    }

    #[tokio::test]
    async fn test_account_lookup_parses_success() {
        let transport = FixedTransport::new(200, r#"{"msaId": "42"}"#);
        let account = get_account(&transport, "0xabc").await.unwrap().unwrap();
        assert_eq!(account.msa_id, "42");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].0, HttpMethod::Get);
        assert_eq!(seen[0].1, "/v1/accounts/account/0xabc");
    }

    #[tokio::test]
    async fn test_account_lookup_maps_404_to_none() {
        let transport = FixedTransport::new(404, "");
        assert!(get_account(&transport, "0xabc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_account_lookup_propagates_server_errors() {
        let transport = FixedTransport::new(503, "downstream unavailable");
        let err = get_account(&transport, "0xabc").await.unwrap_err();
        match err {
            SiwfError::GatewayRequestFailed { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "downstream unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_chain_info_uses_blockinfo_path() {
        let transport = FixedTransport::new(
            200,
            r#"{"blocknumber": 32, "finalized_blocknumber": 30, "genesis": "0x4a58", "runtime_version": 2}"#,
        );
        let info = get_chain_info(&transport).await.unwrap();
        assert_eq!(info.finalized_blocknumber, 30);
        assert_eq!(
            transport.seen.lock().unwrap()[0].1,
            "/v1/frequency/blockinfo"
        );
    }

    #[tokio::test]
    async fn test_siwf_submission_wraps_payload_in_base64url() {
        let transport = FixedTransport::new(200, r#"{"controlKey": "0xdef"}"#);
        let siwf_response = SiwfResponse {
            user_public_key: SiwfPublicKey::from_account_id("0xabc"),
            payloads: vec![SiwfPayload {
                signature: SignatureEnvelope::secp256k1("0xsig"),
                endpoint: None,
                body: PayloadBody::Login(LoginPayload {
                    message: "m".to_string(),
                }),
            }],
            credentials: vec![],
        };

        let result = post_siwf(&transport, &siwf_response).await.unwrap();
        assert_eq!(result.control_key, "0xdef");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].1, "/v2/accounts/siwf");
        let encoded = seen[0].2.as_ref().unwrap()["authorizationPayload"]
            .as_str()
            .unwrap()
            .to_string();
        let decoded = crate::codec::string_from_base64_url(&encoded).unwrap();
        let round_trip: serde_json::Value = serde_json::from_str(&decoded).unwrap();
        assert_eq!(round_trip["userPublicKey"]["encodedValue"], "0xabc");
        assert_eq!(round_trip["payloads"][0]["type"], "login");
        assert_eq!(round_trip["credentials"], serde_json::json!([]));
    }

    /// 404s until the configured attempt, then returns an account.
    struct LateTransport {
        ready_on: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl GatewayTransport for LateTransport {
        async fn fetch(
            &self,
            _method: HttpMethod,
            _path: &str,
            _body: Option<serde_json::Value>,
        ) -> Result<GatewayResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.ready_on {
                Ok(GatewayResponse::new(200, r#"{"msaId": "9"}"#.as_bytes().to_vec()))
            } else {
                Ok(GatewayResponse::new(404, Vec::new()))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_poll_retries_absence_until_created() {
        let transport = LateTransport {
            ready_on: 3,
            calls: AtomicU32::new(0),
        };
        let account = poll_for_account(
            &transport,
            "0xabc",
            Duration::from_secs(5),
            Duration::from_secs(600),
        )
        .await
        .unwrap();
        assert_eq!(account.msa_id, "9");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_poll_times_out_when_never_created() {
        let transport = FixedTransport::new(404, "");
        let err = poll_for_account(
            &transport,
            "0xabc",
            Duration::from_secs(5),
            Duration::from_secs(20),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SiwfError::PollTimeoutExceeded { attempts: 4 }
        ));
    }
}
