//! Error types for the SIWF SDK

use thiserror::Error;

/// Errors surfaced by the SIWF orchestration core.
///
/// Everything is raised to the nearest awaiting caller; the only internal
/// retry in the SDK is the fixed-interval account-materialization poll.
#[derive(Error, Debug)]
pub enum SiwfError {
    /// Input was not a 40-hex-digit address, with or without a `0x` prefix
    #[error("Given address \"{0}\" is not a valid Ethereum address.")]
    InvalidAddressFormat(String),

    /// An item action carried data that is not a well-formed hex string
    #[error("Expected HexString: {0}")]
    MalformedHexPayload(String),

    /// The provider named in the signed request has no Gateway account
    #[error("Unable to find provider account!")]
    ProviderAccountNotFound,

    /// Sign-up was attempted without a required field
    #[error("{0} missing for non-existent account.")]
    MissingSignUpField(&'static str),

    /// The Gateway answered with a non-success, non-404 status
    #[error("Gateway request failed with status {status}: {body}")]
    GatewayRequestFailed { status: u16, body: String },

    /// The bounded poll exhausted its time budget
    #[error("Poll timeout exceeded after {attempts} attempts")]
    PollTimeoutExceeded { attempts: u32 },

    /// The encoded signed request could not be decoded
    #[error("Failed to decode signed request: {0}")]
    RequestDecodeError(String),

    /// A success response from the Gateway did not parse as expected
    #[error("Invalid gateway response: {0}")]
    InvalidGatewayResponse(String),

    /// JSON serialization of an outgoing payload failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The injected signing callback rejected the request
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// The transport could not complete the request at all
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SiwfError {
    fn from(err: reqwest::Error) -> Self {
        SiwfError::Transport(err.to_string())
    }
}

/// Convenience result type for SDK operations
pub type Result<T> = std::result::Result<T, SiwfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_matches_wire_text() {
        let err = SiwfError::MissingSignUpField("signUpHandle");
        assert_eq!(
            err.to_string(),
            "signUpHandle missing for non-existent account."
        );
    }

    #[test]
    fn test_invalid_address_message_embeds_input() {
        let err = SiwfError::InvalidAddressFormat("0x1234".to_string());
        assert_eq!(
            err.to_string(),
            "Given address \"0x1234\" is not a valid Ethereum address."
        );
    }
}
