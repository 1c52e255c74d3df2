//! Sign-In With Frequency (SIWF) orchestration SDK
//!
//! Client-side core of the SIWF v2 authorization flow against a Frequency
//! Gateway. The host application keeps key custody and network policy;
//! this crate owns everything between: decoding the provider's signed
//! request, deciding between login and sign-up, assembling and signing the
//! payload set, submitting it, and watching for the created account to
//! materialize on chain.
//!
//! ## Integration Seams
//!
//! 1. **SignatureProvider** - wallet signing callback; receives
//!    `personal_sign` / `eth_signTypedData_v4` shaped requests it can relay
//!    to a browser provider unchanged
//! 2. **GatewayTransport** - HTTP seam to the Gateway; bring your own or
//!    use the bundled reqwest-backed [`HttpTransport`]
//! 3. **MsaCreationCallback** - optional notification from a detached task
//!    once a freshly created account exists on chain
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use siwf_sdk::{start_siwf, HttpTransport, HttpTransportConfig, SiwfOptions};
//!
//! let transport = Arc::new(HttpTransport::new(HttpTransportConfig::new(
//!     "https://gateway.example.net",
//! ))?);
//!
//! let result = start_siwf(
//!     "0xf24FF3a9CF04c71Dbc94D0b566f7A27B94566cac",
//!     &my_wallet_signer,
//!     transport,
//!     &encoded_signed_request,
//!     SiwfOptions {
//!         sign_up_handle: Some("ExampleHandle".to_string()),
//!         sign_up_email: Some("user@example.net".to_string()),
//!         ..SiwfOptions::default()
//!     },
//! )
//! .await?;
//!
//! println!("control key: {}", result.control_key);
//! ```

pub mod address;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod gateway;
pub mod login;
pub mod payloads;
pub mod poll;
pub mod recovery;
pub mod signing;
pub mod signup;
pub mod siwf;
pub mod transport;
pub mod types;

// Re-exports: the one-call entry point plus its seams
pub use address::normalize_account_address;
pub use codec::decode_signed_request;
pub use config::SiwfConfig;
pub use error::{Result, SiwfError};
pub use recovery::{ContactType, RecoverySecretProvider, StandardRecoverySecret};
pub use signing::{Eip712Document, SignatureProvider, SignatureRequest};
pub use signup::MsaCreationCallback;
pub use siwf::{start_siwf, SiwfOptions};
pub use transport::{GatewayTransport, HttpTransport, HttpTransportConfig};
pub use types::{AccountResponse, ChainInfoResponse, GatewaySiwfResponse};
