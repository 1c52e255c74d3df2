//! Wire codecs for the SIWF protocol
//!
//! Unpadded base64url over UTF-8 text is the protocol's one binary encoding:
//! the provider's encoded signed request arrives in it, and the aggregated
//! authorization payload POSTed to the Gateway is wrapped in it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;

use crate::error::{Result, SiwfError};
use crate::types::request::SiwfSignedRequest;

/// Encode a UTF-8 string as unpadded base64url.
pub fn string_to_base64_url(input: &str) -> String {
    URL_SAFE_NO_PAD.encode(input.as_bytes())
}

/// Decode unpadded base64url back into the UTF-8 string it encodes.
///
/// Fails with [`SiwfError::RequestDecodeError`] on a bad alphabet, stray
/// padding, or non-UTF-8 output; nothing is coerced.
pub fn string_from_base64_url(input: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(input.as_bytes())
        .map_err(|e| SiwfError::RequestDecodeError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SiwfError::RequestDecodeError(e.to_string()))
}

/// Decode a provider's signed request from its transport form.
pub fn decode_signed_request(encoded: &str) -> Result<SiwfSignedRequest> {
    let json = string_from_base64_url(encoded)?;
    serde_json::from_str(&json).map_err(|e| SiwfError::RequestDecodeError(e.to_string()))
}

/// Serialize a value to JSON and wrap it in base64url, the Gateway's
/// authorization-payload form.
pub fn encode_authorization_payload<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(string_to_base64_url(&json))
}
