//! Graph key generation and locally issued credential documents

use chrono::{SecondsFormat, Utc};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::types::{
    CredentialSchema, GraphKeyCredential, GraphKeySubject, RecoverySecretCredential,
    RecoverySecretSubject, VerifiableCredential, CREDENTIAL_CONTEXT, GRAPH_KEY_SCHEMA_URL,
    RECOVERY_SECRET_SCHEMA_URL, VERIFIED_GRAPH_KEY_CREDENTIAL,
    VERIFIED_RECOVERY_SECRET_CREDENTIAL,
};

/// A freshly generated X25519 key pair, hex encoded with a 0x prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphKeyPair {
    pub public_key_hex: String,
    pub private_key_hex: String,
}

/// Generate an X25519 key pair for the user's private social graph.
pub fn generate_graph_key_pair() -> GraphKeyPair {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    GraphKeyPair {
        public_key_hex: format!("0x{}", hex::encode(public.to_bytes())),
        private_key_hex: format!("0x{}", hex::encode(secret.to_bytes())),
    }
}

fn account_did(account_id: &str) -> String {
    format!("did:ethr:{account_id}")
}

/// Current instant in the RFC 3339 millisecond form the protocol uses for
/// credential validFrom and login issuedAt fields.
pub(crate) fn issued_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Self-issued credential escrowing the graph key pair with the provider.
pub fn build_graph_key_credential(account_id: &str, pair: &GraphKeyPair) -> GraphKeyCredential {
    let did = account_did(account_id);
    VerifiableCredential {
        context: CREDENTIAL_CONTEXT.iter().map(|s| s.to_string()).collect(),
        credential_type: vec![
            VERIFIED_GRAPH_KEY_CREDENTIAL.to_string(),
            "VerifiableCredential".to_string(),
        ],
        issuer: did.clone(),
        valid_from: Some(issued_now()),
        credential_schema: CredentialSchema::json_schema(GRAPH_KEY_SCHEMA_URL),
        credential_subject: GraphKeySubject {
            id: did,
            encoded_public_key_value: pair.public_key_hex.clone(),
            encoded_private_key_value: pair.private_key_hex.clone(),
            encoding: "base16".to_string(),
            format: "bare".to_string(),
            curve_type: "X25519".to_string(),
            key_type: "dsnp.public-key-key-agreement".to_string(),
        },
        proof: None,
    }
}

/// Self-issued credential carrying the recovery secret back to the caller.
pub fn build_recovery_secret_credential(
    account_id: &str,
    recovery_secret: &str,
) -> RecoverySecretCredential {
    let did = account_did(account_id);
    VerifiableCredential {
        context: CREDENTIAL_CONTEXT.iter().map(|s| s.to_string()).collect(),
        credential_type: vec![
            VERIFIED_RECOVERY_SECRET_CREDENTIAL.to_string(),
            "VerifiableCredential".to_string(),
        ],
        issuer: did.clone(),
        valid_from: Some(issued_now()),
        credential_schema: CredentialSchema::json_schema(RECOVERY_SECRET_SCHEMA_URL),
        credential_subject: RecoverySecretSubject {
            id: did,
            recovery_secret: recovery_secret.to_string(),
        },
        proof: None,
    }
}
