// Wallet provider seam - the external collaborator behind the modal
// Real deployments adapt a browser-injected or walletconnect-style provider;
// tests and the demo binary use the mock.

use crate::wallet::Address;
use async_trait::async_trait;
use secp256k1::{All, Message, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// WALLET ERRORS
// ============================================================================

/// Errors surfaced by signer acquisition
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("User cancelled the wallet selection")]
    UserCancelled,

    #[error("No compatible wallet provider is reachable")]
    ProviderUnavailable,

    #[error("Wallet refused to switch to network '{0}'")]
    NetworkSwitchRejected(String),

    #[error("Wallet rejected the signature request")]
    SignatureRejected,

    #[error("Provider error: {0}")]
    Provider(String),
}

// ============================================================================
// PROVIDER HANDLE
// ============================================================================

/// Raw handle returned by a wallet provider after the user picks an account.
///
/// This is what gets passed through to the identity network untouched; the
/// network's client library drives signature challenges through it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderHandle {
    provider_id: String,
    address: Address,
    network: String,
}

impl ProviderHandle {
    /// Create a new handle
    pub fn new(provider_id: &str, address: Address, network: &str) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            address,
            network: network.to_string(),
        }
    }

    /// Identifier of the backing provider (e.g. "injected")
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// The selected account address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The network the provider is currently on
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Handle re-pointed at another network (after a successful switch)
    pub fn with_network(mut self, network: &str) -> Self {
        self.network = network.to_string();
        self
    }
}

impl fmt::Display for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.provider_id, self.network, self.address)
    }
}

// ============================================================================
// WALLET PROVIDER TRAIT
// ============================================================================

/// Abstract wallet provider
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Run the provider's connection flow for the given target network.
    /// May prompt the user; resolves once an account is selected.
    async fn connect(&self, network: &str) -> Result<ProviderHandle, WalletError>;

    /// Ask the wallet to sign a message with the account behind the handle
    async fn sign(&self, handle: &ProviderHandle, message: &[u8]) -> Result<Vec<u8>, WalletError>;

    /// Ask the wallet to move the account to another network
    async fn switch_network(
        &self,
        handle: &ProviderHandle,
        network: &str,
    ) -> Result<(), WalletError>;
}

// ============================================================================
// MOCK WALLET
// ============================================================================

/// Mock implementation of WalletProvider for tests and the demo binary.
///
/// Holds a real secp256k1 key and derives its address the Ethereum way
/// (Keccak-256 of the uncompressed public key, last 20 bytes), so signatures
/// and addresses behave like the real thing.
pub struct MockWallet {
    secp: Secp256k1<All>,
    secret: SecretKey,
    address: Address,
    current_network: String,
    cancel: bool,
    unavailable: bool,
    refuse_switch: bool,
    refuse_sign: bool,
    delay_ms: u64,
    connect_calls: AtomicUsize,
    sign_calls: AtomicUsize,
    switch_calls: AtomicUsize,
    requested_networks: Mutex<Vec<String>>,
}

impl MockWallet {
    /// Create a mock wallet with a fresh random account on the given network
    pub fn new(network: &str) -> Self {
        let secp = Secp256k1::new();
        let secret = SecretKey::new(&mut rand::thread_rng());
        let address = Self::derive_address(&secp, &secret);

        Self {
            secp,
            secret,
            address,
            current_network: network.to_string(),
            cancel: false,
            unavailable: false,
            refuse_switch: false,
            refuse_sign: false,
            delay_ms: 0,
            connect_calls: AtomicUsize::new(0),
            sign_calls: AtomicUsize::new(0),
            switch_calls: AtomicUsize::new(0),
            requested_networks: Mutex::new(Vec::new()),
        }
    }

    /// Simulate the user dismissing the selection modal
    pub fn with_cancel(mut self) -> Self {
        self.cancel = true;
        self
    }

    /// Simulate no reachable wallet
    pub fn with_unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Refuse network switch requests
    pub fn with_switch_rejected(mut self) -> Self {
        self.refuse_switch = true;
        self
    }

    /// Refuse signature requests
    pub fn with_sign_rejected(mut self) -> Self {
        self.refuse_sign = true;
        self
    }

    /// Add a delay before responding to any call
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// The wallet's account address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Number of connect prompts shown so far
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Number of signature requests so far
    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    /// Number of network switch requests so far
    pub fn switch_calls(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }

    /// Target networks the connect prompts asked for, in call order
    pub fn requested_networks(&self) -> Vec<String> {
        self.requested_guard().clone()
    }

    fn requested_guard(&self) -> MutexGuard<'_, Vec<String>> {
        match self.requested_networks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn derive_address(secp: &Secp256k1<All>, secret: &SecretKey) -> Address {
        let public = secp256k1::PublicKey::from_secret_key(secp, secret);
        let uncompressed = public.serialize_uncompressed();
        // Skip the 0x04 prefix byte, keep the last 20 digest bytes
        let digest = Keccak256::digest(&uncompressed[1..]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Address::from_bytes(bytes)
    }

    async fn pause(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn connect(&self, network: &str) -> Result<ProviderHandle, WalletError> {
        self.pause().await;
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_guard().push(network.to_string());

        if self.unavailable {
            return Err(WalletError::ProviderUnavailable);
        }
        if self.cancel {
            return Err(WalletError::UserCancelled);
        }

        Ok(ProviderHandle::new(
            "mock",
            self.address.clone(),
            &self.current_network,
        ))
    }

    async fn sign(&self, handle: &ProviderHandle, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        self.pause().await;
        self.sign_calls.fetch_add(1, Ordering::SeqCst);

        if self.refuse_sign {
            return Err(WalletError::SignatureRejected);
        }
        if handle.address() != &self.address {
            return Err(WalletError::Provider("unknown account".into()));
        }

        let digest: [u8; 32] = Sha256::digest(message).into();
        let msg = Message::from_digest(digest);
        let signature = self.secp.sign_ecdsa(&msg, &self.secret);
        Ok(signature.serialize_compact().to_vec())
    }

    async fn switch_network(
        &self,
        _handle: &ProviderHandle,
        network: &str,
    ) -> Result<(), WalletError> {
        self.pause().await;
        self.switch_calls.fetch_add(1, Ordering::SeqCst);

        if self.refuse_switch {
            return Err(WalletError::NetworkSwitchRejected(network.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_connect_returns_handle() {
        let wallet = MockWallet::new("goerli");
        let handle = wallet.connect("goerli").await.unwrap();
        assert_eq!(handle.address(), wallet.address());
        assert_eq!(handle.network(), "goerli");
    }

    #[tokio::test]
    async fn test_mock_signatures_are_compact() {
        let wallet = MockWallet::new("goerli");
        let handle = wallet.connect("goerli").await.unwrap();
        let sig = wallet.sign(&handle, b"challenge").await.unwrap();
        assert_eq!(sig.len(), 64);
    }
}
