// Wallet modal - owns the selection flow configuration and the acquired
// capability. One instance per application controller; never ambient state.

use crate::wallet::{SigningCapability, WalletError, WalletProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// MODAL CONFIG
// ============================================================================

/// Configuration for the wallet selection modal.
///
/// Built once at startup and reused across connect attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalConfig {
    /// Target network the session must run on
    pub network: String,
    /// Provider-specific options, keyed by provider id (empty by default)
    pub provider_options: HashMap<String, String>,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            network: "goerli".to_string(),
            provider_options: HashMap::new(),
        }
    }
}

impl ModalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, network: &str) -> Self {
        self.network = network.to_string();
        self
    }

    pub fn with_provider_option(mut self, key: &str, value: &str) -> Self {
        self.provider_options
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.network.is_empty() {
            return Err(WalletError::Provider("network cannot be empty".into()));
        }
        Ok(())
    }
}

// ============================================================================
// WALLET MODAL
// ============================================================================

/// The wallet selection flow.
///
/// Caches the acquired capability: repeated `acquire` calls while connected
/// hand back the existing capability instead of re-prompting the user.
pub struct WalletModal {
    config: ModalConfig,
    provider: Arc<dyn WalletProvider>,
    cached: Option<SigningCapability>,
}

impl WalletModal {
    /// Create a modal over the given provider
    pub fn new(config: ModalConfig, provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            config,
            provider,
            cached: None,
        }
    }

    /// The modal configuration
    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// The capability acquired in this session, if any
    pub fn capability(&self) -> Option<&SigningCapability> {
        self.cached.as_ref()
    }

    /// Run the acquisition flow.
    ///
    /// Prompts the user through the provider's connection flow and, when the
    /// provider's current network differs from the configured target, asks
    /// the wallet to switch before handing the capability out.
    pub async fn acquire(&mut self) -> Result<SigningCapability, WalletError> {
        if let Some(capability) = &self.cached {
            debug!(address = %capability.address(), "reusing acquired capability");
            return Ok(capability.clone());
        }

        self.config.validate()?;

        let mut handle = self.provider.connect(&self.config.network).await?;
        debug!(%handle, "wallet connected");

        if handle.network() != self.config.network {
            self.provider
                .switch_network(&handle, &self.config.network)
                .await?;
            handle = handle.with_network(&self.config.network);
            debug!(network = %self.config.network, "wallet switched network");
        }

        let capability = SigningCapability::new(self.provider.clone(), handle);
        self.cached = Some(capability.clone());
        Ok(capability)
    }

    /// Drop the cached capability (on disconnect)
    pub fn release(&mut self) {
        self.cached = None;
    }
}
