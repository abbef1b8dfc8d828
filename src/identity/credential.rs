use crate::wallet::{Address, ProviderHandle, SigningCapability};

/// Authentication credential submitted to the identity network.
///
/// Pairs the raw provider handle with the account address, plus the
/// signature over the session challenge once the wallet has produced it.
/// Built once per connect attempt and consumed by the bootstrap call.
#[derive(Clone, Debug)]
pub struct AuthCredential {
    handle: ProviderHandle,
    address: Address,
    signature: Option<Vec<u8>>,
}

impl AuthCredential {
    /// Build a credential from an acquired signing capability
    pub fn from_capability(capability: &SigningCapability) -> Self {
        Self {
            handle: capability.handle().clone(),
            address: capability.address().clone(),
            signature: None,
        }
    }

    /// The raw provider handle
    pub fn handle(&self) -> &ProviderHandle {
        &self.handle
    }

    /// The account address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The challenge signature, once attached
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// Attach the wallet's signature over the challenge
    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Whether the challenge has been signed
    pub fn is_signed(&self) -> bool {
        self.signature.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// A malformed credential pairs an address with a handle for a
    /// different account
    pub fn is_consistent(&self) -> bool {
        self.handle.address() == &self.address
    }

    /// The challenge message the wallet signs to prove account control
    pub fn challenge_bytes(&self) -> Vec<u8> {
        format!(
            "Allow this account to control your identity\n{}\n{}",
            self.address,
            self.handle.network()
        )
        .into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{MockWallet, WalletProvider};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_credential_matches_capability() {
        let wallet = Arc::new(MockWallet::new("goerli"));
        let handle = wallet.connect("goerli").await.unwrap();
        let capability = SigningCapability::new(wallet, handle);

        let credential = AuthCredential::from_capability(&capability);

        assert!(credential.is_consistent());
        assert!(!credential.is_signed());
        assert_eq!(credential.address(), capability.address());
    }

    #[tokio::test]
    async fn test_challenge_binds_address_and_network() {
        let wallet = Arc::new(MockWallet::new("goerli"));
        let handle = wallet.connect("goerli").await.unwrap();
        let capability = SigningCapability::new(wallet, handle);

        let credential = AuthCredential::from_capability(&capability);
        let challenge = String::from_utf8(credential.challenge_bytes()).unwrap();

        assert!(challenge.contains(&credential.address().to_string()));
        assert!(challenge.contains("goerli"));
    }
}
