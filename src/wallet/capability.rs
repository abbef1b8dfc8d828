use crate::wallet::{Address, ProviderHandle, WalletError, WalletProvider};
use std::fmt;
use std::sync::Arc;

/// A connected account's signing capability.
///
/// Pairs the raw provider handle with the derived address and keeps the
/// provider reachable for signature challenges. Held for the duration of
/// the session, never persisted.
#[derive(Clone)]
pub struct SigningCapability {
    provider: Arc<dyn WalletProvider>,
    handle: ProviderHandle,
    address: Address,
}

impl SigningCapability {
    /// Wrap a provider handle acquired through the modal flow
    pub fn new(provider: Arc<dyn WalletProvider>, handle: ProviderHandle) -> Self {
        let address = handle.address().clone();
        Self {
            provider,
            handle,
            address,
        }
    }

    /// The account address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The raw provider handle
    pub fn handle(&self) -> &ProviderHandle {
        &self.handle
    }

    /// Produce a signature over the given message with the wallet
    pub async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        self.provider.sign(&self.handle, message).await
    }
}

impl fmt::Debug for SigningCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCapability")
            .field("handle", &self.handle)
            .field("address", &self.address)
            .finish()
    }
}
