//! Runtime configuration for the SIWF orchestrator

use std::time::Duration;

/// Default delay between account-materialization probe attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default total budget for the background materialization poll
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Tunable settings for a [`start_siwf`](crate::start_siwf) run.
///
/// The poll settings bound only the detached account-materialization poll;
/// the initial lookups and signing calls carry no internal timeout.
#[derive(Debug, Clone)]
pub struct SiwfConfig {
    /// Delay between probe attempts of the background poll
    pub poll_interval: Duration,
    /// Total time budget for the background poll
    pub poll_timeout: Duration,
    /// Chain-id salt for checksum derivation of returned control keys.
    /// `None` selects the plain EIP-55 rule.
    pub checksum_chain_id: Option<String>,
}

impl Default for SiwfConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            checksum_chain_id: None,
        }
    }
}

impl SiwfConfig {
    /// Override the background poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the background poll timeout
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Salt control-key checksums with a chain id
    pub fn with_checksum_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.checksum_chain_id = Some(chain_id.into());
        self
    }
}
