//! Verifiable-credential documents carried in the aggregated response
//!
//! The SDK constructs graph-key and recovery-secret credentials locally;
//! email and phone credentials are modeled for pass-through only and are
//! never built here.

use serde::{Deserialize, Serialize};

/// Credential type requested for graph-key escrow.
pub const VERIFIED_GRAPH_KEY_CREDENTIAL: &str = "VerifiedGraphKeyCredential";

/// Credential type requested for recovery-secret issuance.
pub const VERIFIED_RECOVERY_SECRET_CREDENTIAL: &str = "VerifiedRecoverySecretCredential";

/// JSON-LD context shared by every credential this SDK produces.
pub const CREDENTIAL_CONTEXT: [&str; 2] = [
    "https://www.w3.org/ns/credentials/v2",
    "https://www.w3.org/ns/credentials/undefined-terms/v2",
];

pub const GRAPH_KEY_SCHEMA_URL: &str = "https://schemas.frequencyaccess.com/VerifiedGraphKeyCredential/bciqmdvmxd54zve5kifycgsdtoahs5ecf4hal2ts3eexkgocyc5oca2y.json";

pub const RECOVERY_SECRET_SCHEMA_URL: &str = "https://schemas.frequencyaccess.com/VerifiedRecoverySecretCredential/bciqpg6qm4rnu2j4v6ghxqqgwkggokwvxs3t2bexbd3obkypkiryylxq.json";

/// A W3C verifiable credential with a variant-specific subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential<S> {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    pub credential_schema: CredentialSchema,
    pub credential_subject: S,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<serde_json::Value>,
}

/// Schema reference of a credential document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub id: String,
}

impl CredentialSchema {
    pub fn json_schema(id: &str) -> Self {
        Self {
            schema_type: "JsonSchema".to_string(),
            id: id.to_string(),
        }
    }
}

/// Subject of a graph-key escrow credential.
///
/// The private half is embedded deliberately: the credential escrows the
/// graph key with the provider so delegated services can decrypt the user's
/// private graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphKeySubject {
    pub id: String,
    pub encoded_public_key_value: String,
    pub encoded_private_key_value: String,
    pub encoding: String,
    pub format: String,
    #[serde(rename = "type")]
    pub curve_type: String,
    pub key_type: String,
}

/// Subject of a recovery-secret credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySecretSubject {
    pub id: String,
    pub recovery_secret: String,
}

/// Subject of a verified-email credential (pass-through only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubject {
    pub id: String,
    pub email_address: String,
    pub last_verified: String,
}

/// Subject of a verified-phone credential (pass-through only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneSubject {
    pub id: String,
    pub phone_number: String,
    pub last_verified: String,
}

pub type GraphKeyCredential = VerifiableCredential<GraphKeySubject>;
pub type RecoverySecretCredential = VerifiableCredential<RecoverySecretSubject>;
pub type EmailCredential = VerifiableCredential<EmailSubject>;
pub type PhoneCredential = VerifiableCredential<PhoneSubject>;

/// Closed union over the credential documents the protocol carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiwfCredential {
    GraphKey(GraphKeyCredential),
    RecoverySecret(RecoverySecretCredential),
    Email(EmailCredential),
    Phone(PhoneCredential),
}

impl SiwfCredential {
    /// The credential's type array as serialized on the wire.
    pub fn type_array(&self) -> &[String] {
        match self {
            SiwfCredential::GraphKey(c) => &c.credential_type,
            SiwfCredential::RecoverySecret(c) => &c.credential_type,
            SiwfCredential::Email(c) => &c.credential_type,
            SiwfCredential::Phone(c) => &c.credential_type,
        }
    }
}
